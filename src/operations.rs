use anyhow::{anyhow, Context as _, Result};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::{btree_map::Entry, BTreeMap, HashSet};

use crate::ir::{to_cents, MonthlySummary, Overview, SaleRecord, YearMonth};

/// Group sales by (store, month), sorted by store and then month.
pub fn monthly_summaries(
    sales: &[SaleRecord],
    report_generated: NaiveDateTime,
) -> Result<Vec<MonthlySummary>> {
    log::info!("Creating monthly aggregations...");

    let grouped = group_by(
        sales.iter(),
        |sale| (sale.store_id.clone(), sale.year_month()),
        |sale| std::iter::once(sale),
    );

    let summaries = grouped
        .into_iter()
        .map(|((store_id, year_month), sales)| -> Result<MonthlySummary> {
            let context = || anyhow!("Failed to aggregate {} {}", store_id, year_month);
            let total_revenue = total_revenue(&sales).with_context(context)?;
            let total_quantity = total_quantity(&sales).with_context(context)?;
            Ok(MonthlySummary {
                store_id,
                year_month,
                total_revenue: to_cents(total_revenue),
                total_quantity,
                total_orders: count_orders(&sales),
                report_generated,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    log::info!(
        "Aggregation complete: {} monthly records",
        summaries.len()
    );
    Ok(summaries)
}

/// Totals over the whole run. Returns None if there are no sales.
pub fn overview(sales: &[SaleRecord], summaries: &[MonthlySummary]) -> Result<Option<Overview>> {
    let (Some(first_date), Some(last_date)) = (
        sales.iter().map(|sale| sale.date).min(),
        sales.iter().map(|sale| sale.date).max(),
    ) else {
        return Ok(None);
    };
    let stores: HashSet<&str> = sales.iter().map(|sale| sale.store_id.as_str()).collect();
    let sales: Vec<&SaleRecord> = sales.iter().collect();
    Ok(Some(Overview {
        total_revenue: to_cents(total_revenue(&sales).context("Failed to compute overview")?),
        total_orders: summaries.iter().map(|summary| summary.total_orders).sum(),
        total_quantity: total_quantity(&sales).context("Failed to compute overview")?,
        number_of_stores: stores.len(),
        first_date,
        last_date,
    }))
}

/// Restrict summaries to one period, e.g. to re-publish a single month
pub fn summaries_for_month(
    summaries: &[MonthlySummary],
    year_month: YearMonth,
) -> Vec<MonthlySummary> {
    summaries
        .iter()
        .filter(|summary| summary.year_month == year_month)
        .cloned()
        .collect()
}

fn total_revenue(sales: &[&SaleRecord]) -> Result<Decimal> {
    sales.iter().try_fold(Decimal::ZERO, |total, sale| {
        total
            .checked_add(sale.revenue)
            .ok_or_else(|| anyhow!("Revenue total overflowed"))
    })
}

fn total_quantity(sales: &[&SaleRecord]) -> Result<i64> {
    sales
        .iter()
        .filter_map(|sale| sale.quantity)
        .try_fold(0i64, |total, quantity| {
            total
                .checked_add(quantity)
                .ok_or_else(|| anyhow!("Quantity total overflowed"))
        })
}

/// Distinct order ids, where each sale without an order id counts as its own order
fn count_orders(sales: &[&SaleRecord]) -> u64 {
    let mut order_ids = HashSet::new();
    let mut without_id = 0;
    for sale in sales {
        match &sale.order_id {
            Some(order_id) => {
                order_ids.insert(order_id.as_str());
            }
            None => without_id += 1,
        }
    }
    order_ids.len() as u64 + without_id
}

fn group_by<T, K, V, IV>(
    items: impl Iterator<Item = T>,
    key_fn: impl Fn(&T) -> K,
    value_fn: impl Fn(T) -> IV,
) -> BTreeMap<K, Vec<V>>
where
    K: Ord,
    IV: Iterator<Item = V>,
{
    let mut grouped: BTreeMap<K, Vec<V>> = BTreeMap::new();
    for item in items {
        let key = key_fn(&item);
        match grouped.entry(key) {
            Entry::Occupied(mut grouped) => {
                grouped.get_mut().extend(value_fn(item));
            }
            Entry::Vacant(grouped) => {
                grouped.insert(value_fn(item).collect());
            }
        }
    }
    grouped
}
