use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::model::Configuration;

/// Group keys containing this marker are priced as packages
pub const PACKAGE_MARKER: &str = "package";

pub fn is_package_group(group: &str) -> bool {
    group.contains(PACKAGE_MARKER)
}

/// Base price plus every selection price across every group
pub fn total_price(base: f64, configuration: &Configuration) -> f64 {
    base + configuration.iter().map(|(_, value)| value.price()).sum::<f64>()
}

/// Derived view classifying selections into options and packages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base: f64,
    pub options: BTreeMap<String, f64>,
    pub packages: BTreeMap<String, f64>,
    pub total: f64,
}

impl PriceBreakdown {
    pub fn from_configuration(base: f64, configuration: &Configuration) -> Self {
        let mut breakdown = Self {
            base,
            total: total_price(base, configuration),
            ..Self::default()
        };

        for (group, selection) in configuration.selections() {
            let target = if is_package_group(group) {
                &mut breakdown.packages
            } else {
                &mut breakdown.options
            };
            target.insert(selection.value.clone(), selection.price);
        }

        breakdown
    }

    /// Display rows: base, options, packages, then the total
    pub fn lines(&self) -> Vec<(String, String)> {
        let mut lines = vec![("Base Price".to_string(), format_price(self.base))];
        for (label, price) in self.options.iter().chain(self.packages.iter()) {
            lines.push((label.clone(), format!("+{}", format_price(*price))));
        }
        lines.push(("Total MSRP".to_string(), format_price(self.total)));
        lines
    }
}

/// Format as whole currency units, e.g. `$48,500`
pub fn format_price(price: f64) -> String {
    let rounded = price.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}", sign, grouped)
}

/// Dealer-side adjustments applied on top of the configured total
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateRules {
    pub destination_fee: f64,
    pub tax_rate: f64,
    pub multi_package_min: usize,
    pub multi_package_discount: f64,
}

impl Default for EstimateRules {
    fn default() -> Self {
        Self {
            destination_fee: 995.0,
            tax_rate: 0.08,
            multi_package_min: 3,
            multi_package_discount: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub name: String,
    pub amount: f64,
}

/// One priced line of a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub item: String,
    pub price: f64,
    pub category: String,
}

/// Full quote for a configuration, including discounts, fees and taxes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub base_price: f64,
    pub options_total: f64,
    pub packages_total: f64,
    pub discounts: Vec<AppliedDiscount>,
    pub discount_total: f64,
    pub subtotal: f64,
    pub destination_fee: f64,
    pub total_msrp: f64,
    pub estimated_taxes: f64,
    pub estimated_total: f64,
    pub itemized_breakdown: Vec<LineItem>,
}

impl Estimate {
    pub fn calculate(
        catalog: &Catalog,
        model: Option<&str>,
        configuration: &Configuration,
        rules: &EstimateRules,
    ) -> Self {
        let mut estimate = Self {
            base_price: catalog.base_price(model),
            destination_fee: rules.destination_fee,
            ..Self::default()
        };

        let mut package_count = 0;
        for (group, selection) in configuration.selections() {
            if is_package_group(group) {
                estimate.packages_total += selection.price;
                package_count += 1;
            } else {
                estimate.options_total += selection.price;
            }

            let category = match catalog.group(group) {
                Some(g) => g.category().to_string(),
                None if is_package_group(group) => "Package".to_string(),
                None => "Option".to_string(),
            };
            // Free engine, color and trim choices are not quote lines
            if selection.price != 0.0 || matches!(category.as_str(), "Package" | "Option") {
                estimate.itemized_breakdown.push(LineItem {
                    item: selection.value.clone(),
                    price: selection.price,
                    category,
                });
            }
        }

        for discount in &catalog.discounts {
            if discount.requires.iter().all(|v| configuration.is_selected(v)) {
                estimate.discounts.push(AppliedDiscount {
                    name: discount.name.clone(),
                    amount: discount.amount,
                });
            }
        }
        if rules.multi_package_min > 0 && package_count >= rules.multi_package_min {
            estimate.discounts.push(AppliedDiscount {
                name: "Multi-package".to_string(),
                amount: rules.multi_package_discount,
            });
        }

        estimate.calculate_totals(rules.tax_rate);
        estimate
    }

    fn calculate_totals(&mut self, tax_rate: f64) {
        self.discount_total = self.discounts.iter().map(|d| d.amount).sum();
        self.subtotal =
            self.base_price + self.options_total + self.packages_total - self.discount_total;
        self.total_msrp = self.subtotal + self.destination_fee;
        self.estimated_taxes = (self.total_msrp * tax_rate * 100.0).round() / 100.0;
        self.estimated_total = self.total_msrp + self.estimated_taxes;
    }
}
