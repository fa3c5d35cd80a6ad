use std::sync::Arc;

use super::domain::{
    BusinessAddress, ContactDetails, EncryptedBankDetails, KybSubmission,
};

/// Validation and encryption errors raised before a submission is accepted.
///
/// Each missing-field variant names the field group so the caller gets a
/// specific 4xx message rather than a generic failure.
#[derive(Debug, thiserror::Error)]
pub enum KybSubmissionError {
    #[error("business information is incomplete: legal name, registration number, and tax id are required")]
    MissingBusinessInfo,
    #[error("registration country is required")]
    MissingRegistrationCountry,
    #[error("business address is incomplete: street, city, and postal code are required")]
    MissingAddress,
    #[error("contact details are incomplete: name and email are required")]
    MissingContact,
    #[error(transparent)]
    Cipher(#[from] CipherError),
}

impl KybSubmissionError {
    /// True for the synchronous field-group validation failures.
    pub fn is_validation(&self) -> bool {
        !matches!(self, KybSubmissionError::Cipher(_))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("bank detail cipher failure: {0}")]
pub struct CipherError(pub String);

/// Reversible cipher applied to bank account numbers before persistence.
///
/// The actual cipher is deployment-specific (KMS-backed in production); the
/// workflow only requires that encryption happens before storage and that
/// display goes through the masked form.
pub trait BankDetailCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;
}

/// Keyed obfuscation cipher for the demo server and tests.
///
/// Not real cryptography; production deployments inject a KMS-backed
/// implementation of `BankDetailCipher` instead.
#[derive(Debug, Clone)]
pub struct XorObfuscationCipher {
    key: Vec<u8>,
}

impl XorObfuscationCipher {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into().into_bytes();
        Self {
            key: if key.is_empty() { vec![0x5a] } else { key },
        }
    }
}

impl Default for XorObfuscationCipher {
    fn default() -> Self {
        Self::new("marketplace-dev-key")
    }
}

impl BankDetailCipher for XorObfuscationCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let mut out = String::with_capacity(plaintext.len() * 2);
        for (index, byte) in plaintext.bytes().enumerate() {
            let masked = byte ^ self.key[index % self.key.len()];
            out.push_str(&format!("{masked:02x}"));
        }
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        if ciphertext.len() % 2 != 0 {
            return Err(CipherError("ciphertext has odd length".to_string()));
        }
        let mut bytes = Vec::with_capacity(ciphertext.len() / 2);
        for (index, chunk) in ciphertext.as_bytes().chunks(2).enumerate() {
            let hex = std::str::from_utf8(chunk)
                .map_err(|_| CipherError("ciphertext is not valid hex".to_string()))?;
            let value = u8::from_str_radix(hex, 16)
                .map_err(|_| CipherError("ciphertext is not valid hex".to_string()))?;
            bytes.push(value ^ self.key[index % self.key.len()]);
        }
        String::from_utf8(bytes).map_err(|_| CipherError("decrypted bytes are not UTF-8".to_string()))
    }
}

/// A submission that passed field-group validation, with bank details
/// already encrypted.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub business_name: String,
    pub registration_number: String,
    pub tax_id: String,
    pub registration_country: String,
    pub address: BusinessAddress,
    pub contact: ContactDetails,
    pub bank: Option<EncryptedBankDetails>,
}

/// Guard responsible for turning raw submissions into persistable state.
pub struct SubmissionGuard<C> {
    cipher: Arc<C>,
}

impl<C: BankDetailCipher> SubmissionGuard<C> {
    pub fn new(cipher: Arc<C>) -> Self {
        Self { cipher }
    }

    pub fn validate(
        &self,
        submission: &KybSubmission,
    ) -> Result<ValidatedSubmission, KybSubmissionError> {
        if submission.business_name.trim().is_empty()
            || submission.registration_number.trim().is_empty()
            || submission.tax_id.trim().is_empty()
        {
            return Err(KybSubmissionError::MissingBusinessInfo);
        }
        if submission.registration_country.trim().is_empty() {
            return Err(KybSubmissionError::MissingRegistrationCountry);
        }
        if submission.address_line.trim().is_empty()
            || submission.city.trim().is_empty()
            || submission.postal_code.trim().is_empty()
        {
            return Err(KybSubmissionError::MissingAddress);
        }
        if submission.contact_name.trim().is_empty() || submission.contact_email.trim().is_empty()
        {
            return Err(KybSubmissionError::MissingContact);
        }

        let bank = match (&submission.bank_name, &submission.bank_account_number) {
            (Some(bank_name), Some(account)) if !account.trim().is_empty() => {
                let digits: String = account.chars().filter(char::is_ascii_digit).collect();
                let last_four = if digits.len() >= 4 {
                    digits[digits.len() - 4..].to_string()
                } else {
                    digits
                };
                Some(EncryptedBankDetails {
                    bank_name: bank_name.clone(),
                    encrypted_account_number: self.cipher.encrypt(account.trim())?,
                    last_four,
                })
            }
            _ => None,
        };

        Ok(ValidatedSubmission {
            business_name: submission.business_name.trim().to_string(),
            registration_number: submission.registration_number.trim().to_string(),
            tax_id: submission.tax_id.trim().to_string(),
            registration_country: submission.registration_country.trim().to_uppercase(),
            address: BusinessAddress {
                line: submission.address_line.trim().to_string(),
                city: submission.city.trim().to_string(),
                postal_code: submission.postal_code.trim().to_string(),
            },
            contact: ContactDetails {
                name: submission.contact_name.trim().to_string(),
                email: submission.contact_email.trim().to_string(),
            },
            bank,
        })
    }
}
