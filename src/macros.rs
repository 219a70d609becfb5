/// Runs `$fn` and logs how long it took, tagged with `$msg`.
///
/// Logs at debug level unless a `log::Level` is given.
///
/// # Example
///
/// ```no run
/// # fn main {
///     let pairs = measure_time!("reading names", || read_image_names(root, split))?;
/// #}
#[macro_export]
macro_rules! measure_time {
    ($msg: expr, $fn: expr) => {
        $crate::measure_time!($msg, $fn, log::Level::Debug)
    };
    ($msg: expr, $fn: expr, $level: expr) => {{
        let instant = std::time::Instant::now();
        let res = $fn();
        log::log!(
            $level,
            "Finished \"{}\" in {} ms",
            $msg,
            instant.elapsed().as_millis(),
        );
        res
    }};
}
