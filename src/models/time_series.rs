use chrono::NaiveDate;
use serde::Serialize;

use crate::models::DerivedBar;

/// Enriched daily bars, newest first. Owned by the request that built it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    bars: Vec<DerivedBar>,
}

impl TimeSeries {
    /// Build from bars that were derived in ascending order. The one and only
    /// reversal into presentation order happens here.
    pub(crate) fn from_ascending(mut bars: Vec<DerivedBar>) -> Self {
        bars.reverse();
        Self { bars }
    }

    pub fn bars(&self) -> &[DerivedBar] {
        &self.bars
    }

    pub fn iter(&self) -> impl Iterator<Item = &DerivedBar> {
        self.bars.iter()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar.
    pub fn latest_bar(&self) -> Option<&DerivedBar> {
        self.bars.first()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DerivedBar> {
        self.bars.iter().find(|bar| bar.date() == date)
    }

    /// Subsequence of bars satisfying `keep`, order and derived values intact.
    pub fn retain_view<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&DerivedBar) -> bool,
    {
        Self {
            bars: self.bars.iter().filter(|bar| keep(bar)).cloned().collect(),
        }
    }

    /// The `n` most recent bars. Derived values still refer to the full series.
    pub fn latest(&self, n: usize) -> Self {
        Self {
            bars: self.bars.iter().take(n).cloned().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a DerivedBar;
    type IntoIter = std::slice::Iter<'a, DerivedBar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}
