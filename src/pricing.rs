use crate::model::OutputDocument;
use crate::utils::parse_number;
use serde::Deserialize;
use std::collections::HashMap;

pub const RETAIL_SUFFIX: &str = "_rozn";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    /// Nearest integer, ties away from zero.
    #[default]
    Nearest,
    /// Toward zero.
    Truncate,
}

impl Rounding {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Nearest => value.round(),
            Self::Truncate => value.trunc(),
        }
    }
}

/// Percentage markup plus the rounding applied to the marked-up price.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Markup {
    pub percent: f64,
    #[serde(default)]
    pub rounding: Rounding,
}

impl Markup {
    pub fn apply(&self, base: f64) -> f64 {
        self.rounding.apply(base * (1.0 + self.percent / 100.0))
    }
}

/// Snapshot of one record's fields taken before any rule runs.
pub type FieldIndex = HashMap<String, String>;

/// A declarative rewrite of a single field.
pub trait FieldRewrite: Send + Sync {
    /// New text for `name`, or `None` to leave the field as it is.
    fn rewrite(&self, name: &str, current: &str, index: &FieldIndex) -> Option<String>;
}

/// Recomputes `X_rozn` from its wholesale pair `X` when that parses,
/// otherwise from its own prior value.
pub struct RetailMarkup {
    markup: Markup,
}

impl RetailMarkup {
    pub fn new(markup: Markup) -> Self {
        Self { markup }
    }
}

impl FieldRewrite for RetailMarkup {
    fn rewrite(&self, name: &str, current: &str, index: &FieldIndex) -> Option<String> {
        let base_name = name.strip_suffix(RETAIL_SUFFIX)?;
        let base = index
            .get(base_name)
            .and_then(|v| parse_number(v))
            .or_else(|| parse_number(current))?;
        Some(format_price(self.markup.apply(base)))
    }
}

/// Already rounded, so `{:.0}` only drops the fraction digits. Formatting the
/// float keeps magnitudes beyond `i64` intact, and `-0` prints as `0`.
fn format_price(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:.0}")
}

/// Runs a list of field rewrites over every record of a document.
#[derive(Default)]
pub struct PriceAdjuster {
    rules: Vec<Box<dyn FieldRewrite>>,
}

impl PriceAdjuster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: impl FieldRewrite + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn from_markup(markup: Markup) -> Self {
        Self::new().with_rule(RetailMarkup::new(markup))
    }

    /// Rewrites fields in place and returns how many were changed.
    /// Order and untouched fields stay as they were.
    pub fn apply(&self, document: &mut OutputDocument) -> usize {
        let mut rewritten = 0;
        for record in document.records_mut() {
            let index: FieldIndex = record
                .fields()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect();
            for (name, value) in record.fields_mut() {
                for rule in &self.rules {
                    if let Some(new_value) = rule.rewrite(name, value.as_str(), &index) {
                        *value = new_value;
                        rewritten += 1;
                    }
                }
            }
        }
        rewritten
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NormalizedRecord;

    fn document(pairs: &[(&str, &str)]) -> OutputDocument {
        let mut record = NormalizedRecord::default();
        for (n, v) in pairs {
            record.set(n, *v);
        }
        let mut doc = OutputDocument::new("tyres", "tyres.xml");
        doc.push(record);
        doc
    }

    fn markup(percent: f64, rounding: Rounding) -> Markup {
        Markup { percent, rounding }
    }

    fn field<'a>(doc: &'a OutputDocument, name: &str) -> Option<&'a str> {
        doc.records()[0].get(name)
    }

    #[test]
    fn rounding_policies() {
        assert_eq!(Rounding::Nearest.apply(104.5), 105.0);
        assert_eq!(Rounding::Nearest.apply(-104.5), -105.0);
        assert_eq!(Rounding::Nearest.apply(104.49), 104.0);
        assert_eq!(Rounding::Truncate.apply(104.99), 104.0);
        assert_eq!(Rounding::Truncate.apply(-104.99), -104.0);
    }

    #[test]
    fn retail_is_recomputed_from_wholesale() {
        let mut doc = document(&[("price", "100"), ("price_rozn", "90")]);
        let changed = PriceAdjuster::from_markup(markup(5.0, Rounding::Nearest)).apply(&mut doc);
        assert_eq!(changed, 1);
        assert_eq!(field(&doc, "price_rozn"), Some("105"));
        assert_eq!(field(&doc, "price"), Some("100"));
    }

    #[test]
    fn retail_falls_back_to_own_value() {
        let mut doc = document(&[("opt_rozn", "1 000,00")]);
        PriceAdjuster::from_markup(markup(10.0, Rounding::Nearest)).apply(&mut doc);
        assert_eq!(field(&doc, "opt_rozn"), Some("1100"));
    }

    #[test]
    fn unparseable_wholesale_falls_back_to_retail() {
        let mut doc = document(&[("price", "звоните"), ("price_rozn", "200")]);
        PriceAdjuster::from_markup(markup(5.0, Rounding::Nearest)).apply(&mut doc);
        assert_eq!(field(&doc, "price_rozn"), Some("210"));
    }

    #[test]
    fn truncate_policy_drops_fraction() {
        let mut doc = document(&[("price", "999"), ("price_rozn", "")]);
        PriceAdjuster::from_markup(markup(10.0, Rounding::Truncate)).apply(&mut doc);
        // 999 * 1.1 = 1098.9
        assert_eq!(field(&doc, "price_rozn"), Some("1098"));

        let mut doc = document(&[("price", "999"), ("price_rozn", "")]);
        PriceAdjuster::from_markup(markup(10.0, Rounding::Nearest)).apply(&mut doc);
        assert_eq!(field(&doc, "price_rozn"), Some("1099"));
    }

    #[test]
    fn nothing_to_parse_leaves_field_alone() {
        let mut doc = document(&[("price_rozn", "по запросу"), ("name", "Rim")]);
        let changed = PriceAdjuster::from_markup(markup(5.0, Rounding::Nearest)).apply(&mut doc);
        assert_eq!(changed, 0);
        assert_eq!(field(&doc, "price_rozn"), Some("по запросу"));
    }

    #[test]
    fn non_retail_fields_and_order_untouched() {
        let mut doc = document(&[
            ("status", "Под заказ"),
            ("price", "100"),
            ("price_rozn", "90"),
            ("rozn", "7"),
            ("opt", "80"),
        ]);
        PriceAdjuster::from_markup(markup(5.0, Rounding::Nearest)).apply(&mut doc);
        let record = &doc.records()[0];
        assert_eq!(record.names(), vec!["status", "price", "price_rozn", "rozn", "opt"]);
        assert_eq!(record.get("rozn"), Some("7"));
        assert_eq!(record.get("opt"), Some("80"));
    }

    #[test]
    fn rerunning_compounds_only_without_wholesale() {
        let adjuster = PriceAdjuster::from_markup(markup(10.0, Rounding::Nearest));

        // the wholesale base is authoritative, so each run recomputes the same value from it
        let mut doc = document(&[("price", "100"), ("price_rozn", "90")]);
        adjuster.apply(&mut doc);
        adjuster.apply(&mut doc);
        assert_eq!(field(&doc, "price_rozn"), Some("110"));

        // retail-only values compound
        let mut doc = document(&[("price_rozn", "100")]);
        adjuster.apply(&mut doc);
        adjuster.apply(&mut doc);
        assert_eq!(field(&doc, "price_rozn"), Some("121"));

        let mut doc = document(&[("price_rozn", "нет")]);
        adjuster.apply(&mut doc);
        adjuster.apply(&mut doc);
        assert_eq!(field(&doc, "price_rozn"), Some("нет"));
    }

    #[test]
    fn large_prices_keep_their_magnitude() {
        let mut doc = document(&[("price", "10000000000000000000"), ("price_rozn", "")]);
        PriceAdjuster::from_markup(markup(10.0, Rounding::Nearest)).apply(&mut doc);
        let retail = field(&doc, "price_rozn").unwrap();
        assert_eq!(retail.len(), 20);
        assert!(retail.starts_with("1100000000000000"));
        assert_ne!(retail, i64::MAX.to_string());
    }

    #[test]
    fn small_negative_rounds_to_plain_zero() {
        let mut doc = document(&[("price", "-0,4"), ("price_rozn", "")]);
        PriceAdjuster::from_markup(markup(5.0, Rounding::Nearest)).apply(&mut doc);
        assert_eq!(field(&doc, "price_rozn"), Some("0"));
    }

    struct Blank;

    impl FieldRewrite for Blank {
        fn rewrite(&self, name: &str, _current: &str, _index: &FieldIndex) -> Option<String> {
            (name == "opt").then(String::new)
        }
    }

    #[test]
    fn rules_are_pluggable() {
        let mut doc = document(&[("price", "100"), ("price_rozn", "90"), ("opt", "80")]);
        PriceAdjuster::from_markup(markup(5.0, Rounding::Nearest))
            .with_rule(Blank)
            .apply(&mut doc);
        assert_eq!(field(&doc, "price_rozn"), Some("105"));
        assert_eq!(field(&doc, "opt"), Some(""));
    }
}
