use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

const INLINE_ORIGIN: &str = "<inline>";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot read TrialScope config at {path:?}.")]
	ReadConfig {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("Invalid TOML in TrialScope config {origin}.")]
	ParseConfig {
		origin: String,
		#[source]
		source: toml::de::Error,
	},
	#[error("Invalid TrialScope config: {message}")]
	Validation { message: String },
}
impl Error {
	pub(crate) fn parse_inline(source: toml::de::Error) -> Self {
		Self::ParseConfig { origin: INLINE_ORIGIN.to_string(), source }
	}
}
