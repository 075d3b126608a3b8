//! Query presets and SOQL hygiene
//!
//! The gateway ships a small set of named, pre-built queries over the
//! implementation book of business, plus a caller-supplied escape hatch.
//! Custom queries are the operator's own data so their content is not
//! restricted beyond a SELECT-only guard; correct URL encoding happens in
//! the transport adapter.

use trackgate_domain::{GatewayError, Result};

/// Named, pre-built queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPreset {
    /// Implementations with health Risk, High Risk, or Churn
    AtRisk,
    /// Implementations not in a terminal stage
    Active,
    /// Hours remaining on in-flight implementations
    Bandwidth,
    /// Implementations stale for more than 14 days
    Stale,
    /// Count of implementations grouped by stage
    ByStage,
}

impl QueryPreset {
    pub const ALL: &'static [Self] =
        &[Self::AtRisk, Self::Active, Self::Bandwidth, Self::Stale, Self::ByStage];

    /// Stable name used in tool arguments
    pub fn name(self) -> &'static str {
        match self {
            Self::AtRisk => "at_risk",
            Self::Active => "active",
            Self::Bandwidth => "bandwidth",
            Self::Stale => "stale",
            Self::ByStage => "by_stage",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|preset| preset.name() == name)
    }

    /// The SOQL this preset runs
    pub fn soql(self) -> &'static str {
        match self {
            Self::AtRisk => {
                "SELECT Name, Id, Account__r.Name, Program_Health__c, Risks__c, Implementation_Stage__c \
                 FROM Implementation__c \
                 WHERE Program_Health__c IN ('Risk', 'High Risk', 'Churn') \
                 ORDER BY Program_Health__c"
            }
            Self::Active => {
                "SELECT Name, Id, Account__r.Name, Implementation_Stage__c, Percent_Complete__c, \
                 Program_Health__c, Stale_Days__c \
                 FROM Implementation__c \
                 WHERE Implementation_Stage__c NOT IN ('05 - Complete', '06 - Passive', '08 - Unsuccessful') \
                 ORDER BY Implementation_Stage__c"
            }
            Self::Bandwidth => {
                "SELECT Name, Id, Contracted_Hours__c, Actual_Hours_Spent__c, Contracted_Hours_Remaining__c \
                 FROM Implementation__c \
                 WHERE Implementation_Stage__c IN ('01 - Explore', '02 - Planning', '03 - In Progress') \
                 ORDER BY Contracted_Hours_Remaining__c ASC"
            }
            Self::Stale => {
                "SELECT Name, Id, Stale_Days__c, Next_Step_Date__c, Implementation_Stage__c, Account__r.Name \
                 FROM Implementation__c \
                 WHERE Stale_Days__c > 14 \
                 ORDER BY Stale_Days__c DESC"
            }
            Self::ByStage => {
                "SELECT Implementation_Stage__c, COUNT(Id) total \
                 FROM Implementation__c \
                 GROUP BY Implementation_Stage__c \
                 ORDER BY Implementation_Stage__c"
            }
        }
    }
}

/// What to run: a named preset or a caller-supplied SOQL string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySelection {
    Preset(QueryPreset),
    Custom(String),
}

impl QuerySelection {
    /// Parse tool arguments into a selection.
    ///
    /// `query_type` names a preset or the literal `custom`, in which case
    /// `custom_soql` is required.
    pub fn parse(query_type: &str, custom_soql: Option<&str>) -> Result<Self> {
        if query_type == "custom" {
            let soql = custom_soql.ok_or_else(|| {
                GatewayError::validation(
                    ["custom_soql"],
                    "custom_soql is required when query_type is 'custom'",
                )
            })?;
            ensure_select_only(soql)?;
            return Ok(Self::Custom(soql.to_string()));
        }

        QueryPreset::from_name(query_type).map(Self::Preset).ok_or_else(|| {
            let valid: Vec<&str> =
                QueryPreset::ALL.iter().map(|p| p.name()).chain(["custom"]).collect();
            GatewayError::validation(
                ["query_type"],
                format!("Invalid query_type '{query_type}'. Must be one of: {}", valid.join(", ")),
            )
        })
    }

    /// The SOQL to dispatch
    pub fn soql(&self) -> &str {
        match self {
            Self::Preset(preset) => preset.soql(),
            Self::Custom(soql) => soql,
        }
    }
}

/// Reject anything but a SELECT statement.
///
/// Custom queries are read-only by contract; this is a guard against
/// accidentally routed DML, not a SOQL parser.
pub fn ensure_select_only(soql: &str) -> Result<()> {
    if soql.trim_start().to_uppercase().starts_with("SELECT") {
        Ok(())
    } else {
        Err(GatewayError::validation(["custom_soql"], "Only SELECT queries are allowed"))
    }
}

/// Escape a value for interpolation into a single-quoted SOQL literal
pub fn escape_soql_literal(input: &str) -> String {
    input.replace('\\', "\\\\").replace('\'', "\\'")
}
