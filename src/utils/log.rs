use log::LevelFilter;

pub struct Logger;

impl Logger {
    /// Installs the colog formatter at `level`. `ATS_RESUME_LOG` can still
    /// override individual modules.
    pub fn init(level: LevelFilter) {
        let mut builder: env_logger::Builder = colog::default_builder();
        builder
            .filter_level(level)
            .filter_module("tectonic", LevelFilter::Warn)
            .parse_env(env_logger::Env::new().filter("ATS_RESUME_LOG"))
            .init();
    }
}
