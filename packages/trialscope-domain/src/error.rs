pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid date '{value}'; expected YYYY-MM or YYYY-MM-DD.")]
	InvalidDate { value: String },
	#[error("Unknown module '{name}'.")]
	UnknownModule { name: String },
	#[error("Invalid weight for {module}: {message}")]
	InvalidWeight { module: String, message: String },
	#[error("Trial record is missing {field}.")]
	MissingField { field: &'static str },
}
