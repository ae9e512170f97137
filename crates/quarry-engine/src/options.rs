use quarry_io::DEFAULT_EXTENSION;

/// Environment variable that overrides the default worker count.
pub const THREADS_ENV: &str = "QUARRY_THREADS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    /// Worker threads for ingestion and queries. `1` runs everything on the calling thread.
    pub threads: usize,
    /// File extension matched when the input path is a directory.
    pub extension: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl EngineOptions {
    pub fn serial() -> Self {
        Self::default().with_threads(1)
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

fn threads_from_env(var: &str) -> Option<usize> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
}

fn default_threads() -> usize {
    threads_from_env(THREADS_ENV)
        .or_else(|| threads_from_env("RAYON_NUM_THREADS"))
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
}
