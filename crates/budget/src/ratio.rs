use crate::error::{BudgetError, Result};
use serde::{Deserialize, Serialize};

/// Percentage splits of a project budget.
///
/// `government + private` and `private_cash + private_inkind` always sum to
/// 100: every setter rewrites the complement of the field it sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRatio {
    government_pct: u32,
    private_pct: u32,
    private_cash_pct: u32,
    private_inkind_pct: u32,
}

impl Default for BudgetRatio {
    fn default() -> Self {
        Self {
            government_pct: 100,
            private_pct: 0,
            private_cash_pct: 100,
            private_inkind_pct: 0,
        }
    }
}

/// Absolute amounts derived from a total and a [`BudgetRatio`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub total: u64,
    pub government: u64,
    pub private: u64,
    pub private_cash: u64,
    pub private_inkind: u64,
}

impl BudgetRatio {
    /// Build a ratio from the government and private-cash shares
    pub fn new(government_pct: u32, private_cash_pct: u32) -> Result<Self> {
        let mut ratio = Self::default();
        ratio.set_government_pct(government_pct)?;
        ratio.set_private_cash_pct(private_cash_pct)?;
        Ok(ratio)
    }

    pub fn government_pct(&self) -> u32 {
        self.government_pct
    }

    pub fn private_pct(&self) -> u32 {
        self.private_pct
    }

    pub fn private_cash_pct(&self) -> u32 {
        self.private_cash_pct
    }

    pub fn private_inkind_pct(&self) -> u32 {
        self.private_inkind_pct
    }

    pub fn set_government_pct(&mut self, pct: u32) -> Result<()> {
        let pct = checked(pct)?;
        self.government_pct = pct;
        self.private_pct = 100 - pct;
        Ok(())
    }

    pub fn set_private_pct(&mut self, pct: u32) -> Result<()> {
        let pct = checked(pct)?;
        self.private_pct = pct;
        self.government_pct = 100 - pct;
        Ok(())
    }

    pub fn set_private_cash_pct(&mut self, pct: u32) -> Result<()> {
        let pct = checked(pct)?;
        self.private_cash_pct = pct;
        self.private_inkind_pct = 100 - pct;
        Ok(())
    }

    pub fn set_private_inkind_pct(&mut self, pct: u32) -> Result<()> {
        let pct = checked(pct)?;
        self.private_inkind_pct = pct;
        self.private_cash_pct = 100 - pct;
        Ok(())
    }

    /// Split `total` by this ratio.
    ///
    /// Government and cash shares are rounded half up; private and in-kind
    /// take the remainders, so the parts always add up to `total` exactly.
    pub fn apply(&self, total: u64) -> BudgetBreakdown {
        let government = percent_of(total, self.government_pct);
        let private = total - government;
        let private_cash = percent_of(private, self.private_cash_pct);
        let private_inkind = private - private_cash;

        tracing::debug!(
            "Budget {} split gov {} / cash {} / in-kind {}",
            total,
            government,
            private_cash,
            private_inkind
        );

        BudgetBreakdown {
            total,
            government,
            private,
            private_cash,
            private_inkind,
        }
    }
}

fn checked(pct: u32) -> Result<u32> {
    if pct > 100 {
        return Err(BudgetError::InvalidPercentage(pct));
    }
    Ok(pct)
}

// Never exceeds `amount` for pct <= 100.
fn percent_of(amount: u64, pct: u32) -> u64 {
    let scaled = (amount as u128 * pct as u128 + 50) / 100;
    scaled as u64
}
