//! Sign request and default resolution.
//!
//! A [`SignRequest`] keeps every optional field as `Option` so that the
//! caller's intent survives until the workflow runs. [`SignRequest::resolve`]
//! merges it over [`ResolvedSignOptions::default`] exactly once per call.

use crate::infra::error::{SigningError, SigningResult};
use std::fmt;
use std::str::FromStr;

/// How the signature appears on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Invisible,
    Image,
    Qr,
    ImageFromChar,
    QrFromChar,
}

impl Visibility {
    #[must_use]
    pub fn engine_code(self) -> i32 {
        match self {
            Visibility::Invisible => 0,
            Visibility::Image => 1,
            Visibility::Qr => 2,
            Visibility::ImageFromChar => 3,
            Visibility::QrFromChar => 4,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Invisible => "invisible",
            Visibility::Image => "image",
            Visibility::Qr => "qr",
            Visibility::ImageFromChar => "image-from-char",
            Visibility::QrFromChar => "qr-from-char",
        }
    }
}

/// Signature field sub-filter standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldFormat {
    /// `adbe.pkcs7.detached`
    #[default]
    Adbe,
    /// `ETSI.CAdES.detached`
    Pades,
}

impl FieldFormat {
    #[must_use]
    pub fn engine_code(self) -> i32 {
        match self {
            FieldFormat::Adbe => 0,
            FieldFormat::Pades => 1,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FieldFormat::Adbe => "adbe",
            FieldFormat::Pades => "pades",
        }
    }
}

/// Ordinary approval signature or document seal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureKind {
    #[default]
    Signature,
    Seal,
}

impl SignatureKind {
    #[must_use]
    pub fn engine_code(self) -> i32 {
        match self {
            SignatureKind::Signature => 0,
            SignatureKind::Seal => 1,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SignatureKind::Signature => "signature",
            SignatureKind::Seal => "seal",
        }
    }
}

macro_rules! impl_parse_display {
    ($ty:ty, $label:literal, [$($variant:expr),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = SigningError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| SigningError::InvalidInput(format!("Unknown {}: {s}", $label)))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_parse_display!(
    Visibility,
    "visibility",
    [
        Visibility::Invisible,
        Visibility::Image,
        Visibility::Qr,
        Visibility::ImageFromChar,
        Visibility::QrFromChar,
    ]
);
impl_parse_display!(FieldFormat, "field format", [FieldFormat::Adbe, FieldFormat::Pades]);
impl_parse_display!(
    SignatureKind,
    "signature kind",
    [SignatureKind::Signature, SignatureKind::Seal]
);

/// Display rectangle of a visible signature, in PDF user-space units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Rect {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 50.0,
            height: 50.0,
        }
    }
}

/// One signing operation as requested by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignRequest {
    pub input_path: String,
    pub output_path: String,
    pub image_path: Option<String>,
    pub url: Option<String>,
    pub location: Option<String>,
    pub reason: Option<String>,
    pub contact_info: Option<String>,
    pub field_id: Option<String>,
    pub character: Option<String>,
    pub signature_kind: Option<SignatureKind>,
    pub page: Option<i32>,
    pub field_format: Option<FieldFormat>,
    pub visibility: Option<Visibility>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub embed_revocation: Option<bool>,
}

impl SignRequest {
    #[must_use]
    pub fn new(input_path: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_image(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = Some(image_path.into());
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    #[must_use]
    pub fn with_field_format(mut self, format: FieldFormat) -> Self {
        self.field_format = Some(format);
        self
    }

    #[must_use]
    pub fn with_signature_kind(mut self, kind: SignatureKind) -> Self {
        self.signature_kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: i32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.x = Some(rect.x);
        self.y = Some(rect.y);
        self.width = Some(rect.width);
        self.height = Some(rect.height);
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_revocation_embedding(mut self, enabled: bool) -> Self {
        self.embed_revocation = Some(enabled);
        self
    }

    /// Check that both paths are present and name `.pdf` files (any case).
    pub fn validate_paths(&self) -> SigningResult<()> {
        for (label, path) in [("input", &self.input_path), ("output", &self.output_path)] {
            if path.is_empty() {
                return Err(SigningError::InvalidInput(format!("{label} path is empty")));
            }
            if !path.to_ascii_lowercase().ends_with(".pdf") {
                return Err(SigningError::InvalidInput(format!(
                    "{label} path must end with .pdf: {path}"
                )));
            }
        }
        Ok(())
    }

    /// Merge this request over the documented defaults.
    #[must_use]
    pub fn resolve(&self) -> ResolvedSignOptions {
        let d = ResolvedSignOptions::default();
        ResolvedSignOptions {
            image_path: self.image_path.clone().unwrap_or(d.image_path),
            url: self.url.clone().unwrap_or(d.url),
            location: self.location.clone().unwrap_or(d.location),
            reason: self.reason.clone().unwrap_or(d.reason),
            contact_info: self.contact_info.clone().unwrap_or(d.contact_info),
            field_id: self.field_id.clone().unwrap_or(d.field_id),
            character: self.character.clone().unwrap_or(d.character),
            signature_kind: self.signature_kind.unwrap_or(d.signature_kind),
            page: self.page.unwrap_or(d.page),
            field_format: self.field_format.unwrap_or(d.field_format),
            visibility: self.visibility.unwrap_or(d.visibility),
            rect: Rect {
                x: self.x.unwrap_or(d.rect.x),
                y: self.y.unwrap_or(d.rect.y),
                width: self.width.unwrap_or(d.rect.width),
                height: self.height.unwrap_or(d.rect.height),
            },
            embed_revocation: self.embed_revocation.unwrap_or(d.embed_revocation),
        }
    }
}

/// Signature field name used when the request names none.
pub const DEFAULT_FIELD_ID: &str = "SignPDFKit";

/// Fully populated signing parameters handed to the document engine.
///
/// Free-text fields (image path, URL, location, reason, contact) default to
/// empty strings so nothing is stamped into the signature unless asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSignOptions {
    pub image_path: String,
    pub url: String,
    pub location: String,
    pub reason: String,
    pub contact_info: String,
    pub field_id: String,
    pub character: String,
    pub signature_kind: SignatureKind,
    pub page: i32,
    pub field_format: FieldFormat,
    pub visibility: Visibility,
    pub rect: Rect,
    pub embed_revocation: bool,
}

impl Default for ResolvedSignOptions {
    fn default() -> Self {
        Self {
            image_path: String::new(),
            url: String::new(),
            location: String::new(),
            reason: String::new(),
            contact_info: String::new(),
            field_id: DEFAULT_FIELD_ID.to_string(),
            character: "#".to_string(),
            signature_kind: SignatureKind::Signature,
            page: 1,
            field_format: FieldFormat::Adbe,
            visibility: Visibility::Invisible,
            rect: Rect::default(),
            embed_revocation: false,
        }
    }
}
