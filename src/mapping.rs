// Built-in raw → canonical field tables, one per (catalog, supplier)
use crate::model::{Catalog, Supplier};

const DISKS_4TOCHKI: &[(&str, &str)] = &[
    ("cae", "cae"),
    ("brand", "brand"),
    ("model", "model"),
    ("color", "color"),
    ("width", "width"),
    ("diameter", "diameter"),
    ("img_big_my", "img_small"),
    ("name", "name"),
    ("bolts_count", "holes"),
    ("bolts_spacing", "diam_holes"),
    ("et", "et"),
    ("rim_type", "type"),
    ("dia", "diam_center"),
    ("price", "price"),
];

const DISKS_BRINEX: &[(&str, &str)] = &[
    ("product_id", "article"),
    ("name", "name"),
    ("price", "price"),
    ("countAll", "count"),
    ("stockName", "stock"),
    ("proizvoditel", "brand"),
    ("shirina_diska", "width"),
    ("radius", "diameter"),
    ("et", "et"),
    ("DescriptionOfColor", "color"),
    ("vendor_code", "cae"),
    ("material", "type"),
    ("boltnum", "holes"),
    ("boltdistance", "diam_holes"),
    ("categoryname", "model"),
    ("priceOpt", "opt"),
];

// Both tyre suppliers share one table.
const TYRES: &[(&str, &str)] = &[
    ("vendor_code", "cae"),
    ("product_id", "article"),
    ("countAll", "rest"),
    ("stockName", "stock"),
    ("shirina_secheniya", "width"),
    ("visota_secheniya", "height"),
    ("radius", "diameter"),
    ("seasonality", "season"),
    ("categoryname", "model"),
    ("priceOpt", "opt"),
    ("price", "price"),
    ("spikes", "thorn"),
    ("img_big_my", "img"),
    ("proizvoditel", "brand"),
];

/// Returns the built-in table for a supplier's feed in the given catalog.
pub fn builtin_table(catalog: Catalog, supplier: Supplier) -> &'static [(&'static str, &'static str)] {
    match (catalog, supplier) {
        (Catalog::Disks, Supplier::FourTochki) => DISKS_4TOCHKI,
        (Catalog::Disks, Supplier::Brinex) => DISKS_BRINEX,
        (Catalog::Tyres, _) => TYRES,
    }
}
