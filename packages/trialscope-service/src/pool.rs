use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::Result;

/// Builds a fixed-size pool so one request never fans out beyond `workers` threads.
pub(crate) fn build(workers: u32, label: &'static str) -> Result<ThreadPool> {
	let pool = ThreadPoolBuilder::new()
		.num_threads(workers.max(1) as usize)
		.thread_name(move |idx| format!("trialscope-{label}-{idx}"))
		.build()?;

	Ok(pool)
}
