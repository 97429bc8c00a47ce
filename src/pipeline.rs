// Pipeline driver: fetch → normalize → route → append, then reprice and publish
use crate::config::{AppConfig, FeedConfig, PassConfig};
use crate::feed::FeedSource;
use crate::model::{NormalizedRecord, OutputDocument, PipelineError, RawRecord};
use crate::normalizer::FieldNormalizer;
use crate::parser::RecordParser;
use crate::pricing::PriceAdjuster;
use crate::routing::{PartitionRouter, Verdict, apply_category_override, identity_key, screen};
use crate::storage::DocumentSink;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// What happened to the records of one feed during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub scanned: usize,
    pub missing_identity: usize,
    pub excluded: usize,
    pub routed_away: usize,
    pub overridden: usize,
    pub appended: usize,
}

#[derive(Debug, Clone)]
pub struct PassSummary {
    pub destination: String,
    pub feed: String,
    pub stats: PassStats,
}

#[derive(Debug, Clone)]
pub struct DestinationSummary {
    pub destination: String,
    pub file: String,
    pub records: usize,
    pub repriced: usize,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub passes: Vec<PassSummary>,
    pub destinations: Vec<DestinationSummary>,
}

pub struct PipelineDriver<'a> {
    config: &'a AppConfig,
    source: &'a dyn FeedSource,
    sink: &'a dyn DocumentSink,
}

impl<'a> PipelineDriver<'a> {
    pub fn new(config: &'a AppConfig, source: &'a dyn FeedSource, sink: &'a dyn DocumentSink) -> Self {
        Self {
            config,
            source,
            sink,
        }
    }

    /// Runs every feed in configured order, strictly one after another.
    /// Nothing reaches the sink unless every feed was fetched and parsed.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let started_at = Utc::now();
        self.config.validate()?;

        let mut documents: Vec<OutputDocument> = self
            .config
            .destinations
            .iter()
            .map(|d| OutputDocument::new(&d.name, &d.file))
            .collect();
        let mut passes = Vec::new();

        for feed in &self.config.feeds {
            let mut work: Vec<(usize, &PassConfig)> = Vec::new();
            for (index, dest) in self.config.destinations.iter().enumerate() {
                for pass in dest.passes.iter().filter(|p| p.feed == feed.id) {
                    work.push((index, pass));
                }
            }

            if work.is_empty() {
                warn!("Feed {} is not used by any destination, skipping", feed.id);
                continue;
            }

            let records = self.load_feed(feed).await?;
            let normalizer = FieldNormalizer::new(feed.field_map());
            let normalized: Vec<NormalizedRecord> =
                records.iter().map(|r| normalizer.normalize(r)).collect();

            for (index, pass) in work {
                let document = &mut documents[index];
                let stats = run_pass(feed, pass, &records, &normalized, document);
                info!(
                    "Pass {} -> {}: scanned {}, appended {}, no id {}, excluded {}, other location {}",
                    feed.id,
                    document.destination,
                    stats.scanned,
                    stats.appended,
                    stats.missing_identity,
                    stats.excluded,
                    stats.routed_away
                );
                passes.push(PassSummary {
                    destination: document.destination.clone(),
                    feed: feed.id.clone(),
                    stats,
                });
            }
        }

        let mut destinations = Vec::with_capacity(documents.len());
        for (dest, document) in self.config.destinations.iter().zip(documents.iter_mut()) {
            let repriced = match dest.markup {
                Some(markup) => {
                    let changed = PriceAdjuster::from_markup(markup).apply(document);
                    info!(
                        "Repriced {} fields in {} (+{}%, {:?})",
                        changed, dest.name, markup.percent, markup.rounding
                    );
                    changed
                }
                None => 0,
            };
            destinations.push(DestinationSummary {
                destination: dest.name.clone(),
                file: dest.file.clone(),
                records: document.len(),
                repriced,
            });
        }

        self.sink.publish(&documents)?;

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            passes,
            destinations,
        })
    }

    async fn load_feed(&self, feed: &FeedConfig) -> Result<Vec<RawRecord>, PipelineError> {
        info!("Fetching feed {} ({})...", feed.id, feed.supplier);
        let body = self
            .source
            .fetch(&feed.url)
            .await
            .map_err(|source| PipelineError::Fetch {
                feed: feed.id.clone(),
                source,
            })?;

        let records = RecordParser::new(&feed.collection)
            .parse(&body)
            .map_err(|source| PipelineError::Parse {
                feed: feed.id.clone(),
                source,
            })?;
        info!("Feed {}: {} <{}> records", feed.id, records.len(), feed.collection);
        Ok(records)
    }
}

fn run_pass(
    feed: &FeedConfig,
    pass: &PassConfig,
    records: &[RawRecord],
    normalized: &[NormalizedRecord],
    document: &mut OutputDocument,
) -> PassStats {
    let router = PartitionRouter::new(
        feed.availability_marker.as_deref(),
        pass.marker,
        pass.status.as_deref(),
    );
    let mut stats = PassStats::default();

    for (raw, record) in records.iter().zip(normalized) {
        stats.scanned += 1;
        match screen(record, raw, pass.include.as_ref()) {
            Verdict::MissingIdentity => {
                stats.missing_identity += 1;
                continue;
            }
            Verdict::Excluded => {
                stats.excluded += 1;
                continue;
            }
            Verdict::Eligible => {}
        }
        if !router.accepts(raw) {
            stats.routed_away += 1;
            continue;
        }

        let mut record = record.clone();
        router.stamp(&mut record);
        if apply_category_override(&mut record) {
            stats.overridden += 1;
        }
        debug!(
            "{} <- {} from {} ({} fields)",
            document.destination,
            identity_key(&record).unwrap_or_default(),
            feed.id,
            record.len()
        );
        document.push(record);
        stats.appended += 1;
    }

    stats
}
