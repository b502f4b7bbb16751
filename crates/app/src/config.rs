//! Configuration for the simbridge console.
//!
//! Handles parsing command-line arguments on top of a table of named
//! settings with declared defaults.
//!
//! # Philosophy
//!
//! The tool should work with ZERO arguments against a local engine. Every
//! setting has a declared default, can be overridden by an environment
//! variable (`SIMBRIDGE_<NAME>`), and can be overridden again on the
//! command line (`--set NAME=VALUE`, plus shorthands for the common ones).
//! Values are read through typed accessors that fall back to the declared
//! default when an override does not parse.

use std::collections::HashMap;

/// The named settings the console understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    /// Print debugging messages
    Debug,

    /// The engine host to connect to
    Host,

    /// The engine port to connect to
    Port,

    /// Fall back to offline echo mode when the engine is unreachable
    OfflineEcho,
}

impl Setting {
    /// All settings, for help output and name lookup.
    pub const ALL: [Setting; 4] = [
        Setting::Debug,
        Setting::Host,
        Setting::Port,
        Setting::OfflineEcho,
    ];

    /// Name used for `--set NAME=VALUE` and the environment variable.
    pub fn name(self) -> &'static str {
        match self {
            Setting::Debug => "DEBUG",
            Setting::Host => "HOST",
            Setting::Port => "PORT",
            Setting::OfflineEcho => "OFFLINE_ECHO",
        }
    }

    /// Declared default, as text.
    pub fn default_value(self) -> &'static str {
        match self {
            Setting::Debug => "false",
            Setting::Host => "localhost",
            Setting::Port => "8888",
            Setting::OfflineEcho => "true",
        }
    }

    /// Environment variable consulted between the default and the
    /// command line.
    pub fn env_var(self) -> String {
        format!("SIMBRIDGE_{}", self.name())
    }

    /// Resolve a `--set` name back to a setting.
    pub fn from_name(name: &str) -> Option<Setting> {
        Setting::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// Layered setting values: command line over environment over defaults.
#[derive(Debug, Default)]
pub struct Settings {
    overrides: HashMap<&'static str, String>,
}

impl Settings {
    /// Record a command-line override for one setting.
    pub fn set(&mut self, setting: Setting, value: String) {
        self.overrides.insert(setting.name(), value);
    }

    /// String value: override, else environment, else declared default.
    pub fn get(&self, setting: Setting) -> String {
        if let Some(value) = self.overrides.get(setting.name()) {
            return value.clone();
        }
        if let Ok(value) = std::env::var(setting.env_var()) {
            return value;
        }
        setting.default_value().to_string()
    }

    /// Integer value; an unparseable override falls back to the default.
    pub fn get_int(&self, setting: Setting) -> i64 {
        let raw = self.get(setting);
        match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!(
                    "{} value `{}` is not an integer; using default {}",
                    setting.name(),
                    raw,
                    setting.default_value()
                );
                setting.default_value().parse().unwrap_or(0)
            }
        }
    }

    /// Float value; an unparseable override falls back to the default.
    pub fn get_float(&self, setting: Setting) -> f64 {
        let raw = self.get(setting);
        match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!(
                    "{} value `{}` is not a number; using default {}",
                    setting.name(),
                    raw,
                    setting.default_value()
                );
                setting.default_value().parse().unwrap_or(0.0)
            }
        }
    }

    /// Boolean value; anything but `true`/`false` falls back to the
    /// default.
    pub fn get_bool(&self, setting: Setting) -> bool {
        let raw = self.get(setting);
        match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!(
                    "{} value `{}` is not a boolean; using default {}",
                    setting.name(),
                    raw,
                    setting.default_value()
                );
                setting.default_value().parse().unwrap_or(false)
            }
        }
    }
}

/// Complete configuration for a console run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Engine host
    pub host: String,

    /// Engine port
    pub port: u16,

    /// Whether an unreachable engine degrades to offline echo mode
    pub offline_echo: bool,

    /// Whether to raise the log filter to debug
    pub debug: bool,

    /// Whether to print the resolved configuration at startup
    pub print_config: bool,
}

impl Config {
    /// Parse configuration from command-line arguments.
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut settings = Settings::default();
        let mut print_config = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--host" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--host requires a host name".to_string());
                    }
                    settings.set(Setting::Host, args[i].clone());
                }
                "--port" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--port requires a number".to_string());
                    }
                    settings.set(Setting::Port, args[i].clone());
                }
                "--set" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--set requires NAME=VALUE".to_string());
                    }
                    let (name, value) = args[i]
                        .split_once('=')
                        .ok_or_else(|| format!("--set expects NAME=VALUE, got `{}`", args[i]))?;
                    let setting = Setting::from_name(name)
                        .ok_or_else(|| format!("unknown setting: {}", name))?;
                    settings.set(setting, value.to_string());
                }
                "--debug" => {
                    settings.set(Setting::Debug, "true".to_string());
                }
                "--offline-echo" => {
                    settings.set(Setting::OfflineEcho, "true".to_string());
                }
                "--no-offline-echo" => {
                    settings.set(Setting::OfflineEcho, "false".to_string());
                }
                "--print-config" => {
                    print_config = true;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                _ => {
                    return Err(format!("unknown argument: {}", args[i]));
                }
            }
            i += 1;
        }

        let port = settings.get_int(Setting::Port);
        let port = u16::try_from(port).map_err(|_| format!("port out of range: {}", port))?;

        Ok(Config {
            host: settings.get(Setting::Host),
            port,
            offline_echo: settings.get_bool(Setting::OfflineEcho),
            debug: settings.get_bool(Setting::Debug),
            print_config,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!("Engine: {}:{}", self.host, self.port);
        println!("Offline echo fallback: {}", self.offline_echo);
        println!("Debug logging: {}", self.debug);
        println!();
    }
}

fn print_help() {
    println!("simbridge: interactive training console for a remote evolution engine");
    println!();
    println!("USAGE:");
    println!("    simbridge [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --host <HOST>           Engine host (default: localhost)");
    println!("    --port <PORT>           Engine port (default: 8888)");
    println!("    --set <NAME=VALUE>      Override a named setting");
    println!("    --debug                 Raise the log filter to debug");
    println!("    --offline-echo          Echo sends locally if the engine is unreachable (default)");
    println!("    --no-offline-echo       Fail instead of degrading to offline echo");
    println!("    --print-config          Print resolved configuration");
    println!("    --help, -h              Print this help");
    println!();
    println!("SETTINGS (via --set or SIMBRIDGE_<NAME> in the environment):");
    for setting in Setting::ALL {
        println!("    {:<16} default: {}", setting.name(), setting.default_value());
    }
    println!();
    println!("EXAMPLES:");
    println!("    simbridge                                  # Connect to localhost:8888");
    println!("    simbridge --host lab02 --port 9000         # Remote engine");
    println!("    simbridge --no-offline-echo                # Hard-fail without an engine");
    println!("    SIMBRIDGE_DEBUG=true simbridge             # Debug logging via environment");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_zero_arguments_yield_defaults() {
        let config = Config::from_args(&[]).unwrap();
        assert_eq!(config.port, 8888);
        assert!(config.offline_echo);
        assert!(!config.debug);
        assert!(!config.print_config);
    }

    #[test]
    fn test_shorthand_overrides() {
        let config = Config::from_args(&args(&["--host", "lab02", "--port", "9000"])).unwrap();
        assert_eq!(config.host, "lab02");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_set_overrides_named_setting() {
        let config = Config::from_args(&args(&["--set", "PORT=7777"])).unwrap();
        assert_eq!(config.port, 7777);
    }

    #[test]
    fn test_unknown_setting_rejected() {
        assert!(Config::from_args(&args(&["--set", "MOVEMENT_SPEED=150"])).is_err());
    }

    #[test]
    fn test_unknown_argument_rejected() {
        assert!(Config::from_args(&args(&["--verbose"])).is_err());
    }

    #[test]
    fn test_port_out_of_range_rejected() {
        assert!(Config::from_args(&args(&["--port", "70000"])).is_err());
    }

    #[test]
    fn test_unparseable_override_falls_back_to_default() {
        let mut settings = Settings::default();
        settings.set(Setting::Port, "eight-thousand".to_string());
        assert_eq!(settings.get_int(Setting::Port), 8888);
    }

    #[test]
    fn test_typed_accessors() {
        let mut settings = Settings::default();
        settings.set(Setting::Debug, "true".to_string());
        settings.set(Setting::Port, "9000".to_string());

        assert!(settings.get_bool(Setting::Debug));
        assert_eq!(settings.get_int(Setting::Port), 9000);
        assert_eq!(settings.get_float(Setting::Port), 9000.0);
        assert_eq!(settings.get(Setting::Host), "localhost");
    }

    #[test]
    fn test_offline_echo_toggle() {
        let config = Config::from_args(&args(&["--no-offline-echo"])).unwrap();
        assert!(!config.offline_echo);
    }
}
