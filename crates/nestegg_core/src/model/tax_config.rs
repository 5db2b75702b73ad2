//! Federal, provincial and corporate tax tables
//!
//! All amounts are 2025 values in the base year. `TaxConfig::indexed` scales every
//! dollar threshold and credit amount for later years; rates are never indexed.

use serde::{Deserialize, Serialize};

/// Province of residence for the household
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Province {
    #[default]
    #[serde(rename = "ON")]
    Ontario,
    #[serde(rename = "BC")]
    BritishColumbia,
    #[serde(rename = "AB")]
    Alberta,
    #[serde(rename = "QC")]
    Quebec,
}

/// Marginal rate applied to income above `threshold`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub threshold: f64,
    pub rate: f64,
}

const fn bracket(threshold: f64, rate: f64) -> TaxBracket {
    TaxBracket { threshold, rate }
}

/// Dividend tax credit rates, expressed against the grossed-up dividend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendCreditRates {
    pub eligible: f64,
    pub non_eligible: f64,
}

/// Tax rules for one jurisdiction (federal or a province)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JurisdictionTax {
    pub brackets: Vec<TaxBracket>,
    pub basic_personal_amount: f64,
    pub age_amount: f64,
    /// Net income above which the age amount is reduced
    pub age_amount_threshold: f64,
    pub age_amount_reduction_rate: f64,
    pub pension_income_amount: f64,
    /// Rate applied to non-refundable credit amounts (lowest bracket rate)
    pub credit_rate: f64,
    pub dividend_credit: DividendCreditRates,
    /// Surtax brackets applied to basic tax after credits (Ontario)
    #[serde(default)]
    pub surtax: Vec<TaxBracket>,
}

impl JurisdictionTax {
    fn indexed(&self, factor: f64) -> Self {
        let scale = |brackets: &[TaxBracket]| {
            brackets
                .iter()
                .map(|b| bracket(b.threshold * factor, b.rate))
                .collect()
        };
        Self {
            brackets: scale(&self.brackets),
            basic_personal_amount: self.basic_personal_amount * factor,
            age_amount: self.age_amount * factor,
            age_amount_threshold: self.age_amount_threshold * factor,
            age_amount_reduction_rate: self.age_amount_reduction_rate,
            pension_income_amount: self.pension_income_amount,
            credit_rate: self.credit_rate,
            dividend_credit: self.dividend_credit,
            surtax: scale(&self.surtax),
        }
    }

    #[must_use]
    pub fn federal_2025() -> Self {
        Self {
            brackets: vec![
                bracket(0.0, 0.15),
                bracket(57_375.0, 0.205),
                bracket(114_750.0, 0.26),
                bracket(177_882.0, 0.29),
                bracket(253_414.0, 0.33),
            ],
            basic_personal_amount: 16_129.0,
            age_amount: 9_028.0,
            age_amount_threshold: 45_522.0,
            age_amount_reduction_rate: 0.15,
            pension_income_amount: 2_000.0,
            credit_rate: 0.15,
            dividend_credit: DividendCreditRates {
                eligible: 0.150_198,
                non_eligible: 0.090_301,
            },
            surtax: Vec::new(),
        }
    }

    #[must_use]
    pub fn provincial_2025(province: Province) -> Self {
        match province {
            Province::Ontario => Self {
                brackets: vec![
                    bracket(0.0, 0.0505),
                    bracket(52_886.0, 0.0915),
                    bracket(105_775.0, 0.1116),
                    bracket(150_000.0, 0.1216),
                    bracket(220_000.0, 0.1316),
                ],
                basic_personal_amount: 12_747.0,
                age_amount: 6_223.0,
                age_amount_threshold: 46_330.0,
                age_amount_reduction_rate: 0.15,
                pension_income_amount: 1_762.0,
                credit_rate: 0.0505,
                dividend_credit: DividendCreditRates {
                    eligible: 0.10,
                    non_eligible: 0.029_863,
                },
                surtax: vec![bracket(5_710.0, 0.20), bracket(7_307.0, 0.36)],
            },
            Province::BritishColumbia => Self {
                brackets: vec![
                    bracket(0.0, 0.0506),
                    bracket(49_279.0, 0.077),
                    bracket(98_560.0, 0.105),
                    bracket(113_158.0, 0.1229),
                    bracket(137_407.0, 0.147),
                    bracket(186_306.0, 0.168),
                    bracket(259_829.0, 0.205),
                ],
                basic_personal_amount: 12_932.0,
                age_amount: 5_799.0,
                age_amount_threshold: 43_169.0,
                age_amount_reduction_rate: 0.15,
                pension_income_amount: 1_000.0,
                credit_rate: 0.0506,
                dividend_credit: DividendCreditRates {
                    eligible: 0.12,
                    non_eligible: 0.0196,
                },
                surtax: Vec::new(),
            },
            Province::Alberta => Self {
                brackets: vec![
                    bracket(0.0, 0.10),
                    bracket(151_234.0, 0.12),
                    bracket(181_481.0, 0.13),
                    bracket(241_974.0, 0.14),
                    bracket(362_961.0, 0.15),
                ],
                basic_personal_amount: 22_323.0,
                age_amount: 6_221.0,
                age_amount_threshold: 46_308.0,
                age_amount_reduction_rate: 0.10,
                pension_income_amount: 1_719.0,
                credit_rate: 0.10,
                dividend_credit: DividendCreditRates {
                    eligible: 0.0812,
                    non_eligible: 0.0218,
                },
                surtax: Vec::new(),
            },
            Province::Quebec => Self {
                brackets: vec![
                    bracket(0.0, 0.14),
                    bracket(53_255.0, 0.19),
                    bracket(106_495.0, 0.24),
                    bracket(129_590.0, 0.2575),
                ],
                basic_personal_amount: 18_571.0,
                age_amount: 3_986.0,
                age_amount_threshold: 42_090.0,
                age_amount_reduction_rate: 0.1875,
                pension_income_amount: 3_374.0,
                credit_rate: 0.14,
                dividend_credit: DividendCreditRates {
                    eligible: 0.117,
                    non_eligible: 0.0342,
                },
                surtax: Vec::new(),
            },
        }
    }
}

/// Passive-income taxation inside a Canadian-controlled private corporation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorporateTaxConfig {
    /// Combined rate on interest earned inside the corporation
    pub passive_income_rate: f64,
    /// Share of passive income added to RDTOH
    pub refundable_rate: f64,
    /// Part IV tax on portfolio dividends received, fully refundable
    pub part_iv_rate: f64,
    /// Refund per dollar of taxable dividend paid out, capped at the RDTOH balance
    pub dividend_refund_rate: f64,
}

impl Default for CorporateTaxConfig {
    fn default() -> Self {
        Self {
            passive_income_rate: 0.5017,
            refundable_rate: 0.3067,
            part_iv_rate: 0.3833,
            dividend_refund_rate: 0.3833,
        }
    }
}

/// Complete personal and corporate tax configuration for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxConfig {
    pub province: Province,
    pub federal: JurisdictionTax,
    pub provincial: JurisdictionTax,
    /// Quebec federal abatement applied to basic federal tax
    #[serde(default)]
    pub federal_abatement: f64,
    pub eligible_dividend_gross_up: f64,
    pub non_eligible_dividend_gross_up: f64,
    pub capital_gains_inclusion_rate: f64,
    pub oas_clawback_threshold: f64,
    pub oas_clawback_rate: f64,
    pub rrsp_earned_income_rate: f64,
    pub rrsp_annual_max: f64,
    #[serde(default)]
    pub corporate: CorporateTaxConfig,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self::for_province(Province::default())
    }
}

impl TaxConfig {
    /// 2025 tables for a province
    #[must_use]
    pub fn for_province(province: Province) -> Self {
        Self {
            province,
            federal: JurisdictionTax::federal_2025(),
            provincial: JurisdictionTax::provincial_2025(province),
            federal_abatement: if province == Province::Quebec {
                0.165
            } else {
                0.0
            },
            eligible_dividend_gross_up: 0.38,
            non_eligible_dividend_gross_up: 0.15,
            capital_gains_inclusion_rate: 0.50,
            oas_clawback_threshold: 93_454.0,
            oas_clawback_rate: 0.15,
            rrsp_earned_income_rate: 0.18,
            rrsp_annual_max: 32_490.0,
            corporate: CorporateTaxConfig::default(),
        }
    }

    /// Copy with dollar thresholds and credit amounts scaled by `factor`
    #[must_use]
    pub fn indexed(&self, factor: f64) -> Self {
        Self {
            province: self.province,
            federal: self.federal.indexed(factor),
            provincial: self.provincial.indexed(factor),
            federal_abatement: self.federal_abatement,
            eligible_dividend_gross_up: self.eligible_dividend_gross_up,
            non_eligible_dividend_gross_up: self.non_eligible_dividend_gross_up,
            capital_gains_inclusion_rate: self.capital_gains_inclusion_rate,
            oas_clawback_threshold: self.oas_clawback_threshold * factor,
            oas_clawback_rate: self.oas_clawback_rate,
            rrsp_earned_income_rate: self.rrsp_earned_income_rate,
            rrsp_annual_max: self.rrsp_annual_max * factor,
            corporate: self.corporate,
        }
    }
}
