use std::process;

use clap::{App, ArgMatches};

use crate::config::SampleConfig;
use crate::demos::{self, DEMOS};
use crate::window;

fn init_logging(config: &SampleConfig) {
    // RUST_LOG, when set, wins over the -v/-q flags
    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .init();
}

fn list_demos() {
    println!("Available samples:");
    for demo in DEMOS.iter() {
        println!("  {:<10} {}", demo.name, demo.description);
    }
}

fn run(matches: &ArgMatches) -> Result<(), String> {
    let config = SampleConfig::from_matches(matches)?;
    init_logging(&config);

    if matches.is_present("list") {
        list_demos();
        return Ok(());
    }

    let name = matches.value_of("DEMO").unwrap_or_default();
    let demo = demos::find(name)
        .ok_or_else(|| format!("No sample called {}; try --list", name))?;

    config.check_asset_root();
    info!("Starting {}: {}", demo.name, demo.description);

    window::run((demo.create)(), config)
}

pub fn cli_main() {
    let yaml = load_yaml!("cli.yaml");
    let matches = App::from_yaml(yaml).get_matches();

    if let Err(e) = run(&matches) {
        if log_enabled!(log::Level::Error) {
            error!("{}", e);
        } else {
            eprintln!("Error: {}", e);
        }
        process::exit(1);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use log::LevelFilter;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> clap::Result<ArgMatches<'static>> {
        // Matches borrow from the YAML, so it has to outlive the test helper
        let docs: &'static Vec<_> = Box::leak(Box::new(
            clap::YamlLoader::load_from_str(include_str!("cli.yaml")).unwrap(),
        ));
        App::from_yaml(&docs[0]).get_matches_from_safe(args.iter())
    }

    #[test]
    fn defaults() {
        let matches = parse(&["glsamples", "strip"]).unwrap();
        let config = SampleConfig::from_matches(&matches).unwrap();

        assert_eq!(matches.value_of("DEMO"), Some("strip"));
        assert_eq!(config, SampleConfig::default());
    }

    #[test]
    fn flags_reach_the_config() {
        let matches = parse(&[
            "glsamples", "geometry", "--assets", "/opt/samples", "--width", "1024", "--height", "768",
            "--no-vsync", "-vv",
        ])
        .unwrap();
        let config = SampleConfig::from_matches(&matches).unwrap();

        assert_eq!(config.asset_root, PathBuf::from("/opt/samples"));
        assert_eq!((config.width, config.height), (1024, 768));
        assert!(!config.vsync);
        assert_eq!(config.log_level, LevelFilter::Trace);
    }

    #[test]
    fn quiet_only_logs_warnings() {
        let matches = parse(&["glsamples", "-q", "swap"]).unwrap();
        assert_eq!(SampleConfig::from_matches(&matches).unwrap().log_level, LevelFilter::Warn);
    }

    #[test]
    fn list_needs_no_demo() {
        assert!(parse(&["glsamples", "--list"]).is_ok());
        assert!(parse(&["glsamples"]).is_err());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(parse(&["glsamples", "-v", "-q", "strip"]).is_err());
    }

    #[test]
    fn bad_window_size_is_an_error() {
        let matches = parse(&["glsamples", "strip", "--width", "0"]).unwrap();
        assert!(SampleConfig::from_matches(&matches).is_err());
    }
}
