use prometheus::{Counter, Gauge, Histogram, Registry};

pub struct MetricsRegistry {
    pub registry: Registry,

    // Request metrics
    pub recommend_duration: Histogram,
    pub recommend_requests_total: Counter,
    pub recommend_results_total: Counter,
    pub recommend_errors_total: Counter,

    // Catalog metrics
    pub catalog_jobs: Gauge,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Encoding dominates; 1ms to 5 seconds
        let recommend_duration = Histogram::with_opts(
            prometheus::HistogramOpts::new(
                "recommend_duration_seconds",
                "Recommendation request duration in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;

        let recommend_requests_total = Counter::new(
            "recommend_requests_total",
            "Total number of recommendation requests",
        )?;

        let recommend_results_total = Counter::new(
            "recommend_results_total",
            "Total number of recommendations returned",
        )?;

        let recommend_errors_total = Counter::new(
            "recommend_errors_total",
            "Total number of failed recommendation requests",
        )?;

        let catalog_jobs = Gauge::new("catalog_jobs", "Number of jobs in the loaded catalog")?;

        registry.register(Box::new(recommend_duration.clone()))?;
        registry.register(Box::new(recommend_requests_total.clone()))?;
        registry.register(Box::new(recommend_results_total.clone()))?;
        registry.register(Box::new(recommend_errors_total.clone()))?;
        registry.register(Box::new(catalog_jobs.clone()))?;

        Ok(Self {
            registry,
            recommend_duration,
            recommend_requests_total,
            recommend_results_total,
            recommend_errors_total,
            catalog_jobs,
        })
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = prometheus::TextEncoder::new();
        encoder.encode_to_string(&self.registry.gather())
    }
}
