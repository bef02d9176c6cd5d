//! Outlet-type series published under C&SD table 620-67003.
//!
//! Order is the dashboard's display order (major groups first, then their
//! sub-groups), not numeric order.

use crate::domain::SeriesId;

/// `(outlet-type code, description)` for every series the dashboard tracks.
pub const CATALOG: &[(&str, &str)] = &[
    ("2", "Food, drink, tobacco (ex super)"),
    ("8", "Supermarkets"),
    ("9", "Fuels"),
    ("12", "Clothing, footwear and others"),
    ("18", "Consumer durable goods"),
    ("30", "Department stores"),
    ("32", "Jewellery, watches and clocks, and others"),
    ("35", "Other consumer goods"),
    ("49", "Supermarkets and supermarket sections of department stores"),
    ("3", "Fish, livestock and poultry, fresh or frozen"),
    ("4", "Fruits and vegetables, fresh"),
    ("5", "Bread, pastry, confectionery and biscuits"),
    ("6", "Other food not elsewhere classified"),
    ("7", "Alcoholic drinks and tobacco"),
    ("13", "Wearing apparel"),
    ("14", "Footwear, allied products and other clothing accessories"),
    ("19", "Motor vehicles and parts"),
    ("23", "Furniture and fixtures"),
    ("51", "Electrical goods and other consumer durable goods not elsewhere"),
    ("36", "Books, newspapers, stationery and gifts"),
    ("37", "Chinese drugs and herbs"),
    ("38", "Optical shops"),
    ("39", "Medicines and cosmetics"),
    ("40", "Other consumer goods not elsewhere"),
];

pub fn describe(id: SeriesId) -> &'static str {
    CATALOG
        .iter()
        .find(|(code, _)| *code == id.code())
        .map(|(_, desc)| *desc)
        .unwrap_or("")
}
