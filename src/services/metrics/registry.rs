use prometheus::{
    CounterVec, Encoder, Gauge, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Prometheus registry for the listings service
pub struct MetricsRegistry {
    registry: Registry,

    // HTTP
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,

    // Listings
    pub listings_created_total: CounterVec,
    pub listings_verified_total: CounterVec,

    // Search
    pub search_requests_total: CounterVec,
    pub search_results: Histogram,

    // Reminder poller
    pub reminder_ticks_total: CounterVec,
    pub reminder_dispatch_total: CounterVec,
    pub reminder_last_tick_selected: Gauge,

    // Auth
    pub otp_issued_total: CounterVec,
    pub login_attempts_total: CounterVec,
}

impl MetricsRegistry {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests").namespace("estate"),
            &["method", "endpoint", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request duration")
                .namespace("estate")
                .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["method", "endpoint"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        let listings_created_total = CounterVec::new(
            Opts::new("listings_created_total", "Listings submitted").namespace("estate"),
            &["listing_type"],
        )?;
        registry.register(Box::new(listings_created_total.clone()))?;

        let listings_verified_total = CounterVec::new(
            Opts::new("listings_verification_toggles_total", "Admin verification toggles")
                .namespace("estate"),
            &["result"],
        )?;
        registry.register(Box::new(listings_verified_total.clone()))?;

        let search_requests_total = CounterVec::new(
            Opts::new("search_requests_total", "Property searches").namespace("estate"),
            &["filtered"],
        )?;
        registry.register(Box::new(search_requests_total.clone()))?;

        let search_results = Histogram::with_opts(
            HistogramOpts::new("search_results", "Listings returned per search")
                .namespace("estate")
                .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 500.0]),
        )?;
        registry.register(Box::new(search_results.clone()))?;

        let reminder_ticks_total = CounterVec::new(
            Opts::new("reminder_ticks_total", "Reminder poller ticks").namespace("estate"),
            &["outcome"],
        )?;
        registry.register(Box::new(reminder_ticks_total.clone()))?;

        let reminder_dispatch_total = CounterVec::new(
            Opts::new("reminder_dispatch_total", "Reminder notifications by result")
                .namespace("estate"),
            &["channel", "outcome"],
        )?;
        registry.register(Box::new(reminder_dispatch_total.clone()))?;

        let reminder_last_tick_selected = Gauge::with_opts(
            Opts::new("reminder_last_tick_selected", "Listings selected by the latest tick")
                .namespace("estate"),
        )?;
        registry.register(Box::new(reminder_last_tick_selected.clone()))?;

        let otp_issued_total = CounterVec::new(
            Opts::new("otp_issued_total", "One-time codes issued").namespace("estate"),
            &["purpose"],
        )?;
        registry.register(Box::new(otp_issued_total.clone()))?;

        let login_attempts_total = CounterVec::new(
            Opts::new("login_attempts_total", "Login attempts").namespace("estate"),
            &["result"],
        )?;
        registry.register(Box::new(login_attempts_total.clone()))?;

        Ok(Arc::new(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            listings_created_total,
            listings_verified_total,
            search_requests_total,
            search_results,
            reminder_ticks_total,
            reminder_dispatch_total,
            reminder_last_tick_selected,
            otp_issued_total,
            login_attempts_total,
        }))
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> Result<String, Box<dyn std::error::Error>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
