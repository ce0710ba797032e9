//! Global constants used throughout the itdgen codebase.
//!
//! File names, environment variables and defaults that more than one module needs.
//! Defining them centrally keeps the CLI, configuration loader and generators in
//! agreement.

/// Text placed between the governor name and the generator suffix in aspect names.
///
/// `com.example.Customer` with suffix `JavaBean` becomes
/// `com.example.Customer_Roo_JavaBean`.
pub const DEFAULT_ASPECT_INFIX: &str = "_Roo_";

/// Default project file, relative to the working directory.
pub const DEFAULT_PROJECT_FILE: &str = "itdgen.toml";

/// Directory under the user's home holding the global configuration.
pub const GLOBAL_CONFIG_DIR: &str = ".itdgen";

/// Global configuration file name inside [`GLOBAL_CONFIG_DIR`].
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the global configuration path.
pub const CONFIG_ENV_VAR: &str = "ITDGEN_CONFIG";

/// Default number of queued change events before producers wait.
pub const DEFAULT_PIPELINE_BUFFER: usize = 64;

/// Default `quantity` of a data-on-demand governor.
pub const DEFAULT_DOD_QUANTITY: i64 = 10;

/// Extension of rendered aspect files.
pub const ASPECT_FILE_EXTENSION: &str = "aj";
