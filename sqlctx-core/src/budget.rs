//! Priority-weighted token budget split across four context categories.

use std::collections::HashMap;

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::{CHARS_PER_TOKEN, WEIGHT_BUSINESS, WEIGHT_EXAMPLES, WEIGHT_PERFORMANCE, WEIGHT_SCHEMA};

/// Four integer token allocations that sum to ≤ the total budget, plus a
/// usage map updated after assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetAllocation {
    pub schema: u64,
    pub examples: u64,
    pub business: u64,
    pub performance: u64,
    pub usage: HashMap<Category, u64>,
}

impl BudgetAllocation {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.schema + self.examples + self.business + self.performance
    }

    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Schema => self.schema,
            Category::Examples => self.examples,
            Category::Business => self.business,
            Category::Performance => self.performance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Schema,
    Examples,
    Business,
    Performance,
}

static PERFORMANCE_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(slow|performance|optimi[sz]e|index|timeout|latency|bottleneck)\b")
        .expect("static performance-keyword regex is valid")
});

/// Splits `total` across schema/examples/business/performance by priority
/// weight, boosting performance when the query hints at a performance
/// concern or `has_error` is set.
pub struct TokenBudgetAllocator;

impl TokenBudgetAllocator {
    /// Allocates `total` tokens across the four categories.
    ///
    /// Rounding remainders are added to the highest-priority category with
    /// budget > 0, so the sum never exceeds `total`.
    #[must_use]
    pub fn allocate(total: u64, query: &str, has_error: bool) -> BudgetAllocation {
        let performance_weight = if has_error || PERFORMANCE_KEYWORDS.is_match(query) {
            WEIGHT_PERFORMANCE * 2.0
        } else {
            WEIGHT_PERFORMANCE
        };

        let weights = [
            (Category::Schema, WEIGHT_SCHEMA),
            (Category::Examples, WEIGHT_EXAMPLES),
            (Category::Business, WEIGHT_BUSINESS),
            (Category::Performance, performance_weight),
        ];
        let total_weight: f64 = weights.iter().map(|(_, w)| w).sum();

        let mut allocations: HashMap<Category, u64> = HashMap::new();
        let mut assigned = 0u64;
        for (category, weight) in weights {
            let share = ((total as f64) * weight / total_weight).floor() as u64;
            allocations.insert(category, share);
            assigned += share;
        }

        let remainder = total.saturating_sub(assigned);
        if remainder > 0 {
            if let Some((top, _)) = weights
                .iter()
                .filter(|(c, _)| allocations.get(c).copied().unwrap_or(0) > 0)
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            {
                *allocations.get_mut(top).unwrap() += remainder;
            } else if let Some(top) = weights.first() {
                *allocations.get_mut(&top.0).unwrap() += remainder;
            }
        }

        BudgetAllocation {
            schema: allocations[&Category::Schema],
            examples: allocations[&Category::Examples],
            business: allocations[&Category::Business],
            performance: allocations[&Category::Performance],
            usage: HashMap::new(),
        }
    }

    /// Updates the usage map after a category has been assembled.
    pub fn adjust_for_actual_usage(
        allocation: &mut BudgetAllocation,
        category: Category,
        tokens_used: u64,
    ) {
        allocation.usage.insert(category, tokens_used);
    }
}

/// Dependency-free heuristic: max of chars/4 and whitespace-split word count.
#[must_use]
pub fn estimate_tokens(text: &str) -> u64 {
    let by_chars = (text.chars().count() as u64).div_ceil(CHARS_PER_TOKEN as u64);
    let by_words = text.split_whitespace().count() as u64;
    by_chars.max(by_words)
}

/// Returns a prefix of `text` whose estimated token count ≤ `tokens`, cut at
/// a word boundary.
#[must_use]
pub fn truncate_to_budget(text: &str, tokens: u64) -> String {
    if estimate_tokens(text) <= tokens {
        return text.to_string();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let mut result = String::new();
    for word in words {
        let candidate = if result.is_empty() {
            word.to_string()
        } else {
            format!("{result} {word}")
        };
        if estimate_tokens(&candidate) > tokens {
            break;
        }
        result = candidate;
    }
    result
}
