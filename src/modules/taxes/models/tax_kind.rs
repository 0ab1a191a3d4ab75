use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Brazilian import and resale tax lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxKind {
    /// Imposto de Importação (import duty)
    Ii,
    /// Imposto sobre Operações Financeiras (legacy fixed-rate regime only)
    Iof,
    /// Imposto sobre Produtos Industrializados (excise)
    Ipi,
    /// Programa de Integração Social contribution
    Pis,
    /// Contribuição para o Financiamento da Seguridade Social
    Cofins,
    /// State VAT-like tax, charged "por dentro"
    Icms,
}

impl TaxKind {
    pub const ALL: [TaxKind; 6] = [
        TaxKind::Ii,
        TaxKind::Iof,
        TaxKind::Ipi,
        TaxKind::Pis,
        TaxKind::Cofins,
        TaxKind::Icms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaxKind::Ii => "ii",
            TaxKind::Iof => "iof",
            TaxKind::Ipi => "ipi",
            TaxKind::Pis => "pis",
            TaxKind::Cofins => "cofins",
            TaxKind::Icms => "icms",
        }
    }
}

impl fmt::Display for TaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// One BRL amount per tax line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAmounts {
    pub ii: Decimal,
    pub iof: Decimal,
    pub ipi: Decimal,
    pub pis: Decimal,
    pub cofins: Decimal,
    pub icms: Decimal,
}

impl TaxAmounts {
    pub fn get(&self, kind: TaxKind) -> Decimal {
        match kind {
            TaxKind::Ii => self.ii,
            TaxKind::Iof => self.iof,
            TaxKind::Ipi => self.ipi,
            TaxKind::Pis => self.pis,
            TaxKind::Cofins => self.cofins,
            TaxKind::Icms => self.icms,
        }
    }

    pub fn set(&mut self, kind: TaxKind, amount: Decimal) {
        match kind {
            TaxKind::Ii => self.ii = amount,
            TaxKind::Iof => self.iof = amount,
            TaxKind::Ipi => self.ipi = amount,
            TaxKind::Pis => self.pis = amount,
            TaxKind::Cofins => self.cofins = amount,
            TaxKind::Icms => self.icms = amount,
        }
    }

    pub fn total(&self) -> Decimal {
        TaxKind::ALL.iter().map(|k| self.get(*k)).sum()
    }

    /// Line-by-line sum, used to aggregate tax groups
    pub fn add(&self, other: &TaxAmounts) -> TaxAmounts {
        let mut sum = TaxAmounts::default();
        for kind in TaxKind::ALL {
            sum.set(kind, self.get(kind) + other.get(kind));
        }
        sum
    }
}
