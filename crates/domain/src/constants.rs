//! Domain constants
//!
//! Centralized location for the Salesforce object names, picklist
//! vocabularies, and gateway-wide defaults. Picklist matching is exact and
//! case-sensitive; the remote store rejects anything else with unstructured
//! errors, which is why these vocabularies are enforced locally first.

/// Salesforce REST API version the gateway speaks
pub const API_VERSION: &str = "v62.0";

/// Primary record sObject
pub const SOBJECT_IMPLEMENTATION: &str = "Implementation__c";
/// Child record sObject for logged hours
pub const SOBJECT_IMPLEMENTATION_HOURS: &str = "Implementation_Hours__c";

/// Ownership reference field that gates standard-role updates
pub const FIELD_CDE: &str = "CDE__c";

/// Profile name that confers administrator rights
pub const ADMIN_PROFILE_NAME: &str = "System Administrator";

/// Delimiter joining members of a multipicklist value
pub const MULTIPICKLIST_DELIMITER: char = ';';

// Rate limiting of record-creation operations
pub const MAX_CREATES_PER_WINDOW: usize = 5;
pub const CREATE_WINDOW_SECONDS: u64 = 60;

// Credential lifecycle
pub const DEFAULT_TOKEN_LIFETIME_SECONDS: u64 = 1800;
pub const TOKEN_REFRESH_THRESHOLD_SECONDS: u64 = 300;

// HTTP
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

// Defaults applied to newly created implementations
pub const DEFAULT_IMPLEMENTATION_STAGE: &str = "00 - Kick Off Call";
pub const DEFAULT_PROGRAM_HEALTH: &str = "Healthy";

/// Calendar format for every date field (no timezone handling)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const VALID_IMPLEMENTATION_STAGES: &[&str] = &[
    "00 - Kick Off Call",
    "01 - Explore",
    "02 - Planning",
    "03 - In Progress",
    "04 - Final Review",
    "05 - Complete",
    "06 - Passive",
    "07 - Paused",
    "08 - Unsuccessful",
];

pub const VALID_PROGRAM_HEALTH: &[&str] =
    &["Healthy", "Passive", "Paused", "Unresponsive", "Risk", "Churn", "High Risk"];

pub const VALID_CONTRACT_TYPES: &[&str] = &["Annual", "Free Trial", "Pay as you go"];

pub const VALID_TYPES: &[&str] =
    &["Join", "Pure Migration", "Join - Lite", "Join - Quickstart", "Other"];

pub const VALID_MIGRATION_TYPES: &[&str] = &[
    "Customer Tooling",
    "Dual-write and backfill",
    "Parallel Copy",
    "pg_dump and pg_restore",
    "NA",
    "TS Tooling",
    "Live Migration",
];

pub const VALID_FEATURES: &[&str] = &[
    "Read Replicas",
    "HA Replicas",
    "Data Tiering",
    "Caggs",
    "Compression",
    "Migration",
    "Vector",
    "Hypertables",
];

pub const VALID_PROJECT_TASKS: &[&str] = &[
    "CAGG",
    "Case work",
    "Compression",
    "Connection Pooling",
    "HA Replica",
    "Hypershift",
    "Ingest",
    "Internal Meetings - Non Customer",
    "Internal Testing",
    "Migration",
    "POC",
    "Project Plan",
    "Query Optimization",
    "Read Replica",
    "Replica",
    "Retention",
    "CNS",
    "Sales",
    "Sales Call",
    "Schema Design",
    "Security",
    "Sizing",
    "Troubleshooting",
    "VPC",
];

pub const VALID_PROJECT_TYPES: &[&str] = &[
    "Churn",
    "Implementation",
    "Internal Meetings",
    "Join",
    "Join - Lite",
    "Join - QS",
    "Pre-Sales",
    "Pre-Sales (Discover Call)",
    "Projects",
    "Support",
    "Training",
];

pub const VALID_RECORD_STAGES: &[&str] = &["Trial", "Pre-Production", "Production"];

/// Fields computed remotely (roll-ups and formulas). The gateway never
/// writes these; they are stripped from outbound payloads with a warning.
pub const REMOTE_COMPUTED_FIELDS: &[&str] = &[
    "Actual_Hours_Spent__c",
    "Contracted_Hours_Remaining__c",
    "Contracted_Days_Remaining__c",
    "Days_In_Program__c",
    "Join_Days__c",
    "Stale_Days__c",
    "Calculated_Graduation_Date__c",
    "Implementation_Create_Date__c",
    "Program_Start_Date__c",
];

/// Full field list fetched by `get_implementation`
pub const IMPLEMENTATION_DETAIL_FIELDS: &[&str] = &[
    "Id",
    "Name",
    "Implementation_Stage__c",
    "Program_Health__c",
    "Type__c",
    "Contract_Type__c",
    "Percent_Complete__c",
    "In_Production__c",
    "Account__c",
    "Opportunity__c",
    "CDE__c",
    "CSM__c",
    "SA__c",
    "Contracted_Hours__c",
    "Actual_Hours_Spent__c",
    "Contracted_Hours_Remaining__c",
    "Days_In_Program__c",
    "Join_Days__c",
    "Contracted_Days_Remaining__c",
    "Stale_Days__c",
    "Features__c",
    "Migration_Type__c",
    "Risks__c",
    "Comments__c",
    "Post_Mortem__c",
    "Technical_Win__c",
    "Customer_Start_Date__c",
    "Implementation_Create_Date__c",
    "Kick_Off_Call__c",
    "Program_Start_Date__c",
    "Estimated_Graduation_Date__c",
    "Calculated_Graduation_Date__c",
    "Production_Date__c",
    "Final_Review_Call__c",
    "Next_Step_Date__c",
    "Potential_ARR__c",
    "Projected_Amount__c",
    "Contract__c",
    "ARR_Start_of_Program__c",
    "ARR_End_of_Program__c",
    "Grafana__c",
    "Project_Doc__c",
    "Migration_Source__c",
    "Support_Tier__c",
];
