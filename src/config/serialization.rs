//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Serialize the [service.headers] table
    fn headers_to_toml(&self) -> String {
        if self.service.headers.is_empty() {
            return "\n# [service.headers]\n# x-team = \"platform\"\n".to_string();
        }

        let mut output = String::from("\n[service.headers]\n");
        for (name, value) in &self.service.headers {
            output.push_str(&format!("{} = {}\n", quoted(name), quoted(value)));
        }
        output
    }

    /// Render the full config file, commented
    pub fn to_toml(&self) -> String {
        let api_key_env = match &self.service.api_key_env {
            Some(var) => format!("api_key_env = {}\n", quoted(var)),
            None => "# api_key_env = \"CODEGEN_API_KEY\"\n".to_string(),
        };

        format!(
            r#"# codecast configuration

# Generation endpoint (CODECAST_ENDPOINT overrides)
endpoint = {endpoint}

[service]
connect_timeout_secs = {connect_timeout}
# Env var holding a bearer token (CODECAST_API_KEY overrides)
{api_key_env}{headers}
[render]
show_line_numbers = {line_numbers}
# Any bundled syntect theme, e.g. base16-ocean.dark, InspiredGitHub, Solarized (dark)
syntax_theme = {theme}

[clipboard]
# How long the "copied" acknowledgement stays visible
copy_timeout_ms = {copy_timeout}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# JSON file logging (in addition to the log panel or stderr)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = {log_file_prefix}
"#,
            endpoint = quoted(&self.service.endpoint),
            connect_timeout = self.service.connect_timeout_secs,
            api_key_env = api_key_env,
            headers = self.headers_to_toml(),
            line_numbers = self.render.show_line_numbers,
            theme = quoted(&self.render.syntax_theme),
            copy_timeout = self.clipboard.copy_timeout_ms,
            log_level = quoted(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = quoted(&self.logging.file_dir.display().to_string()),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = quoted(&self.logging.file_prefix),
        )
    }
}

/// TOML basic string, escaped
fn quoted(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}
