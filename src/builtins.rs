// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in work functions served by the `analysis-backends worker` command.
//!
//! Drivers that ship their own worker executable register their own functions
//! instead; these cover the command-line runner and smoke tests of a
//! deployment.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::traits::WorkFunction;
use crate::worker::FunctionRegistry;

/// `x -> x * x`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Square;

impl WorkFunction for Square {
    const NAME: &'static str = "square";
    type Input = i64;
    type Output = i64;

    fn call(&self, input: &i64) -> anyhow::Result<i64> {
        input
            .checked_mul(*input)
            .ok_or_else(|| anyhow::anyhow!("square of {} overflows i64", input))
    }
}

/// `x -> x * factor`; the factor travels with the function to every worker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Scale {
    pub factor: f64,
}

impl WorkFunction for Scale {
    const NAME: &'static str = "scale";
    type Input = f64;
    type Output = f64;

    fn call(&self, input: &f64) -> anyhow::Result<f64> {
        Ok(input * self.factor)
    }
}

/// Identity that rejects one value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FailOn {
    pub value: i64,
}

impl WorkFunction for FailOn {
    const NAME: &'static str = "fail_on";
    type Input = i64;
    type Output = i64;

    fn call(&self, input: &i64) -> anyhow::Result<i64> {
        if *input == self.value {
            anyhow::bail!("invalid value {}", input);
        }
        Ok(*input)
    }
}

/// Sum of `i * i` over one computation group of frame indices.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SumOfSquares;

impl WorkFunction for SumOfSquares {
    const NAME: &'static str = "sum_of_squares";
    type Input = Range<u64>;
    type Output = u64;

    fn call(&self, input: &Range<u64>) -> anyhow::Result<u64> {
        input.clone().try_fold(0u64, |total, i| {
            i.checked_mul(i)
                .and_then(|square| total.checked_add(square))
                .ok_or_else(|| anyhow::anyhow!("sum of squares over {:?} overflows u64", input))
        })
    }
}

/// Registry with every built-in function.
pub fn registry() -> FunctionRegistry {
    FunctionRegistry::new()
        .register::<Square>()
        .register::<Scale>()
        .register::<FailOn>()
        .register::<SumOfSquares>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square() {
        assert_eq!(Square.call(&-4).unwrap(), 16);
        assert!(Square.call(&i64::MAX).is_err());
    }

    #[test]
    fn test_fail_on() {
        let function = FailOn { value: 3 };

        assert_eq!(function.call(&2).unwrap(), 2);
        assert_eq!(function.call(&3).unwrap_err().to_string(), "invalid value 3");
    }

    #[test]
    fn test_sum_of_squares() {
        assert_eq!(SumOfSquares.call(&(0..4)).unwrap(), 14);
        assert_eq!(SumOfSquares.call(&(5..5)).unwrap(), 0);
    }

    #[test]
    fn test_registry_contains_builtins() {
        assert_eq!(
            registry().names(),
            vec!["fail_on", "scale", "square", "sum_of_squares"]
        );
    }
}
