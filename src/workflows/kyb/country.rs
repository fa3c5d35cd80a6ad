use super::domain::{ComplianceItem, SupplierId};

/// One country-configured compliance document requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplianceRequirement {
    pub item_type: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub mandatory: bool,
}

impl ComplianceRequirement {
    pub fn instantiate(&self, supplier_id: &SupplierId) -> ComplianceItem {
        ComplianceItem {
            supplier_id: supplier_id.clone(),
            item_type: self.item_type.to_string(),
            display_name: self.display_name.to_string(),
            description: self.description.to_string(),
            mandatory: self.mandatory,
            document_key: None,
        }
    }
}

/// Fallback list used when no country configuration exists.
pub const DEFAULT_REQUIREMENTS: [ComplianceRequirement; 6] = [
    ComplianceRequirement {
        item_type: "certificate_of_incorporation",
        display_name: "Certificate of incorporation",
        description: "Official proof that the business entity is registered",
        mandatory: true,
    },
    ComplianceRequirement {
        item_type: "tax_registration",
        display_name: "Tax registration certificate",
        description: "Confirms the tax identifier supplied at submission",
        mandatory: true,
    },
    ComplianceRequirement {
        item_type: "proof_of_address",
        display_name: "Proof of business address",
        description: "Utility bill or lease dated within the last three months",
        mandatory: true,
    },
    ComplianceRequirement {
        item_type: "director_identification",
        display_name: "Director identification",
        description: "Government-issued photo ID for at least one director",
        mandatory: true,
    },
    ComplianceRequirement {
        item_type: "bank_statement",
        display_name: "Bank statement",
        description: "Recent statement matching the declared account",
        mandatory: false,
    },
    ComplianceRequirement {
        item_type: "beneficial_ownership_declaration",
        display_name: "Beneficial ownership declaration",
        description: "Declaration of owners holding 25% or more",
        mandatory: false,
    },
];

const DE_REQUIREMENTS: [ComplianceRequirement; 7] = [
    ComplianceRequirement {
        item_type: "handelsregister_extract",
        display_name: "Handelsregister extract",
        description: "Commercial register extract no older than six months",
        mandatory: true,
    },
    ComplianceRequirement {
        item_type: "tax_registration",
        display_name: "Steuernummer confirmation",
        description: "Tax office confirmation of the Steuernummer or USt-IdNr",
        mandatory: true,
    },
    ComplianceRequirement {
        item_type: "proof_of_address",
        display_name: "Proof of business address",
        description: "Utility bill or lease dated within the last three months",
        mandatory: true,
    },
    ComplianceRequirement {
        item_type: "director_identification",
        display_name: "Managing director identification",
        description: "Photo ID for each Geschaeftsfuehrer",
        mandatory: true,
    },
    ComplianceRequirement {
        item_type: "transparency_register_extract",
        display_name: "Transparency register extract",
        description: "Transparenzregister extract listing beneficial owners",
        mandatory: true,
    },
    ComplianceRequirement {
        item_type: "bank_statement",
        display_name: "Bank statement",
        description: "Recent statement matching the declared account",
        mandatory: false,
    },
    ComplianceRequirement {
        item_type: "articles_of_association",
        display_name: "Articles of association",
        description: "Gesellschaftsvertrag or Satzung",
        mandatory: false,
    },
];

const GB_REQUIREMENTS: [ComplianceRequirement; 5] = [
    ComplianceRequirement {
        item_type: "companies_house_extract",
        display_name: "Companies House extract",
        description: "Current appointments and filing history extract",
        mandatory: true,
    },
    ComplianceRequirement {
        item_type: "tax_registration",
        display_name: "HMRC registration",
        description: "VAT or corporation tax registration confirmation",
        mandatory: true,
    },
    ComplianceRequirement {
        item_type: "proof_of_address",
        display_name: "Proof of business address",
        description: "Utility bill or lease dated within the last three months",
        mandatory: true,
    },
    ComplianceRequirement {
        item_type: "director_identification",
        display_name: "Director identification",
        description: "Photo ID for at least one registered director",
        mandatory: true,
    },
    ComplianceRequirement {
        item_type: "psc_register",
        display_name: "PSC register",
        description: "Persons with significant control register entry",
        mandatory: false,
    },
];

/// Lookup of per-country compliance document lists.
///
/// Countries without a configured list fall back to the fixed default set.
#[derive(Debug, Default, Clone)]
pub struct CountryComplianceCatalog;

impl CountryComplianceCatalog {
    pub fn requirements(&self, country_code: &str) -> &'static [ComplianceRequirement] {
        match country_code.trim().to_ascii_uppercase().as_str() {
            "DE" => &DE_REQUIREMENTS,
            "GB" | "UK" => &GB_REQUIREMENTS,
            _ => &DEFAULT_REQUIREMENTS,
        }
    }

    pub fn seed_items(&self, supplier_id: &SupplierId, country_code: &str) -> Vec<ComplianceItem> {
        self.requirements(country_code)
            .iter()
            .map(|requirement| requirement.instantiate(supplier_id))
            .collect()
    }
}
