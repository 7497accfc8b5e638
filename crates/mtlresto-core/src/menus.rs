//! Scraped restaurant menu files and their normalization for the store.
//!
//! A menu file is one JSON document per restaurant, in one of three shapes: a
//! list of sections with items, an `{"external_menu": url}` object, or the
//! string `"not_available"`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder the scraper writes for items whose title it could not read.
const UNKNOWN_ITEM: &str = "Unknown Item";
const NOT_AVAILABLE: &str = "not_available";
/// Restaurant name used when nothing printable survives sanitizing.
pub const UNNAMED_RESTAURANT: &str = "Unnamed";

static FORBIDDEN_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.#$/\[\]]+").expect("static regex"));

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("invalid menu JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("menu file has no menu data")]
    Empty,

    #[error("menu for {restaurant} has no valid items")]
    NoValidItems { restaurant: String },

    #[error("unrecognized menu status '{0}'")]
    UnknownStatus(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuStatus {
    Internal,
    External,
    NotAvailable,
}

impl MenuStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MenuStatus::Internal => "internal",
            MenuStatus::External => "external",
            MenuStatus::NotAvailable => "not_available",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMenuSection {
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub items: Vec<RawMenuItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMenuItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One menu file as written by the scraper.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MenuFile {
    Sections(Vec<RawMenuSection>),
    External { external_menu: String },
    Status(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub name: String,
    pub price: String,
    pub description: String,
    pub section: String,
}

/// Normalized restaurant document ready for the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestaurantMenu {
    pub name: String,
    pub status: MenuStatus,
    pub external_menu_url: Option<String>,
    pub items: Vec<MenuItem>,
}

impl MenuFile {
    /// # Errors
    ///
    /// Returns [`MenuError::InvalidJson`] if `content` is not one of the
    /// three menu shapes.
    pub fn parse(content: &str) -> Result<Self, MenuError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Normalizes the file for `restaurant` (usually the file stem).
    ///
    /// # Errors
    ///
    /// - [`MenuError::Empty`] for an empty section list.
    /// - [`MenuError::NoValidItems`] when no item has a usable name.
    /// - [`MenuError::UnknownStatus`] for a bare string other than
    ///   `"not_available"`.
    pub fn into_restaurant_menu(self, restaurant: &str) -> Result<RestaurantMenu, MenuError> {
        let name = Some(sanitize_name(restaurant))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNNAMED_RESTAURANT.to_string());
        match self {
            MenuFile::Status(status) if status == NOT_AVAILABLE => Ok(RestaurantMenu {
                name,
                status: MenuStatus::NotAvailable,
                external_menu_url: None,
                items: Vec::new(),
            }),
            MenuFile::Status(other) => Err(MenuError::UnknownStatus(other)),
            MenuFile::External { external_menu } => Ok(RestaurantMenu {
                name,
                status: MenuStatus::External,
                external_menu_url: Some(external_menu),
                items: Vec::new(),
            }),
            MenuFile::Sections(sections) if sections.is_empty() => Err(MenuError::Empty),
            MenuFile::Sections(sections) => {
                let items = normalize_items(sections);
                if items.is_empty() {
                    return Err(MenuError::NoValidItems { restaurant: name });
                }
                Ok(RestaurantMenu {
                    name,
                    status: MenuStatus::Internal,
                    external_menu_url: None,
                    items,
                })
            }
        }
    }
}

fn normalize_items(sections: Vec<RawMenuSection>) -> Vec<MenuItem> {
    let mut items = Vec::new();
    for section in sections {
        let section_name = sanitize_name(section.section.as_deref().unwrap_or("Unknown Section"));
        for item in section.items {
            let Some(raw_name) = item
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty() && *n != UNKNOWN_ITEM)
            else {
                continue;
            };
            let name = sanitize_name(raw_name);
            if name.is_empty() {
                continue;
            }
            items.push(MenuItem {
                name,
                price: item.price.unwrap_or_else(|| "N/A".to_string()),
                description: item
                    .description
                    .unwrap_or_else(|| "No description".to_string()),
                section: section_name.clone(),
            });
        }
    }
    items
}

/// Makes `value` safe as a document key: folds French/Latin accents to ASCII,
/// drops any other non-ASCII character, collapses runs of `.#$/[]` into `_`
/// and trims surrounding whitespace.
#[must_use]
pub fn sanitize_name(value: &str) -> String {
    let folded: String = value.chars().filter_map(fold_to_ascii).collect();
    FORBIDDEN_RUN.replace_all(&folded, "_").trim().to_string()
}

fn fold_to_ascii(c: char) -> Option<char> {
    if c.is_ascii() {
        return Some(c);
    }
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'ç' => 'c',
        'Ç' => 'C',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        '\u{2019}' | '\u{2018}' => '\'',
        _ => return None,
    };
    Some(folded)
}
