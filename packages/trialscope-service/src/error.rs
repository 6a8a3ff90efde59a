pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Worker pool error: {message}")]
	WorkerPool { message: String },
}
impl From<trialscope_domain::Error> for Error {
	fn from(err: trialscope_domain::Error) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}

impl From<rayon::ThreadPoolBuildError> for Error {
	fn from(err: rayon::ThreadPoolBuildError) -> Self {
		Self::WorkerPool { message: err.to_string() }
	}
}
