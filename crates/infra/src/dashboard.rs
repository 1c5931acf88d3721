//! Dashboard view: stock per category, reorder list and production capacity.

use serde::Serialize;

use stockroom_core::Money;
use stockroom_inventory::{Bom, BomId, Part, PartCategory, PartId, StockStatus};
use stockroom_receiving::{ArticleStatus, IncomingArticle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartStock {
    pub part_id: PartId,
    pub part_number: String,
    pub name: String,
    pub current_stock: u64,
    pub min_stock: u64,
    pub status: StockStatus,
    /// Per-unit quantity in this category's BOM, if the part is a component.
    pub bom_quantity: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySection {
    pub category: PartCategory,
    pub bom_id: Option<BomId>,
    pub buildable_units: Option<u64>,
    pub parts: Vec<PartStock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub parts: usize,
    pub vendors: usize,
    /// Incoming articles not yet approved.
    pub awaiting_approval: usize,
    pub stock_value: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub sections: Vec<CategorySection>,
    /// Parts at or below their minimum, most urgent first.
    pub low_stock: Vec<PartStock>,
    /// Units of the production BOM buildable now (0 without one).
    pub production_buildable: u64,
    pub totals: Totals,
}

/// Build the dashboard from the live parts, BOMs and articles.
///
/// Each category is paired with the first BOM of that category.
pub fn build(parts: &[&Part], boms: &[&Bom], articles: &[&IncomingArticle], vendors: usize) -> Dashboard {
    let stock_of = |id: PartId| parts.iter().find(|p| p.id_typed() == id).map(|p| p.current_stock());

    let sections: Vec<CategorySection> = PartCategory::ALL
        .iter()
        .map(|&category| {
            let bom = boms.iter().find(|b| b.category() == category);
            CategorySection {
                category,
                bom_id: bom.map(|b| b.id_typed()),
                buildable_units: bom.map(|b| b.buildable_units(stock_of)),
                parts: parts
                    .iter()
                    .filter(|p| p.category() == category)
                    .map(|p| part_stock(p, bom.and_then(|b| b.quantity_of(p.id_typed()))))
                    .collect(),
            }
        })
        .collect();

    let mut low_stock: Vec<PartStock> = sections
        .iter()
        .flat_map(|s| s.parts.iter())
        .filter(|p| p.status.needs_reorder())
        .cloned()
        .collect();
    low_stock.sort_by_key(|p| (p.status != StockStatus::Critical, p.current_stock));

    let production_buildable = sections
        .iter()
        .find(|s| s.category == PartCategory::Production)
        .and_then(|s| s.buildable_units)
        .unwrap_or(0);

    Dashboard {
        sections,
        low_stock,
        production_buildable,
        totals: Totals {
            parts: parts.len(),
            vendors,
            awaiting_approval: articles
                .iter()
                .filter(|a| a.status() != ArticleStatus::Approved)
                .count(),
            stock_value: parts.iter().map(|p| p.stock_value()).sum(),
        },
    }
}

fn part_stock(part: &Part, bom_quantity: Option<u64>) -> PartStock {
    PartStock {
        part_id: part.id_typed(),
        part_number: part.part_number().to_string(),
        name: part.name().to_string(),
        current_stock: part.current_stock(),
        min_stock: part.min_stock(),
        status: part.stock_status(),
        bom_quantity,
    }
}
