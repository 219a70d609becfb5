use clap::{App, AppSettings, Arg, SubCommand};

pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

pub fn build_app() -> App<'static, 'static> {
    App::new("voc-tfrecord")
        .about("Converts the PASCAL VOC segmentation dataset into TFRecord files")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("log-config")
                .long("log-config")
                .takes_value(true)
                .help("log4rs config file (default: log4rs.yml)"),
        )
        .subcommand(convert_subcommand())
        .subcommand(inspect_subcommand())
}

pub fn convert_subcommand() -> App<'static, 'static> {
    SubCommand::with_name("convert")
        .about("Writes fcn_train.record and fcn_val.record")
        .arg(
            Arg::with_name("data-dir")
                .long("data-dir")
                .takes_value(true)
                .help("Root directory of the VOC dataset (default: ./VOC/)"),
        )
        .arg(
            Arg::with_name("output-dir")
                .long("output-dir")
                .takes_value(true)
                .help("Directory to write the record files to (default: .)"),
        )
        .arg(
            Arg::with_name("min-size")
                .long("min-size")
                .takes_value(true)
                .help("Images with a smaller width or height are skipped (default: 224)"),
        )
        .arg(
            Arg::with_name("chunk-size")
                .long("chunk-size")
                .takes_value(true)
                .help("Number of images decoded in parallel (default: 64)"),
        )
        .arg(
            Arg::with_name("split")
                .long("split")
                .takes_value(true)
                .possible_values(&["train", "val", "all"])
                .help("Which split to convert (default: all)"),
        )
}

pub fn inspect_subcommand() -> App<'static, 'static> {
    SubCommand::with_name("inspect")
        .about("Validates a record file and prints per class pixel counts")
        .arg(
            Arg::with_name("record-file")
                .required(true)
                .index(1)
                .help("Record file to read"),
        )
}
