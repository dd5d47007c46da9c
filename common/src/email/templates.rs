//! Per-brand sender settings and the warranty-card HTML template.
//!
//! The template carries `{{name}}` placeholders that are substituted with a
//! single regex pass. Customer values are HTML-escaped before substitution.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::DashboardError;
use crate::model::email::EmailTemplateData;
use crate::model::warranty::Brand;

static PLACEHOLDER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrandEmailConfig {
    pub brand: Brand,
    pub from_email: &'static str,
    pub from_name: &'static str,
    /// `{warrantyId}` is replaced with the warranty id.
    pub subject_template: &'static str,
    pub reply_to: &'static str,
    accent: &'static str,
    tagline: &'static str,
    activation_line: &'static str,
}

const BRAND_CONFIGS: [BrandEmailConfig; 3] = [
    BrandEmailConfig {
        brand: Brand::Baybee,
        from_email: "warranty@baybee.com",
        from_name: "Baybee Warranty Team",
        subject_template: "Your Baybee Warranty Card - {warrantyId}",
        reply_to: "support@baybee.com",
        accent: "#e91e63",
        tagline: "Thank you for choosing Baybee!",
        activation_line: "Your warranty has been successfully registered",
    },
    BrandEmailConfig {
        brand: Brand::Drogo,
        from_email: "warranty@drogo.com",
        from_name: "Drogo Warranty Team",
        subject_template: "Your Drogo Warranty Card - {warrantyId}",
        reply_to: "support@drogo.com",
        accent: "#9c27b0",
        tagline: "Premium gaming experience guaranteed!",
        activation_line: "Your gaming warranty is now active",
    },
    BrandEmailConfig {
        brand: Brand::Domestica,
        from_email: "warranty@domestica.com",
        from_name: "Domestica Warranty Team",
        subject_template: "Your Domestica Warranty Card - {warrantyId}",
        reply_to: "support@domestica.com",
        accent: "#3f51b5",
        tagline: "Quality home solutions for your family!",
        activation_line: "Your home warranty is now active",
    },
];

pub fn brand_config(brand: Brand) -> BrandEmailConfig {
    match brand {
        Brand::Baybee => BRAND_CONFIGS[0],
        Brand::Drogo => BRAND_CONFIGS[1],
        Brand::Domestica => BRAND_CONFIGS[2],
    }
}

pub fn subject(brand: Brand, warranty_id: &str) -> String {
    brand_config(brand)
        .subject_template
        .replace("{warrantyId}", warranty_id)
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

const WARRANTY_CARD_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Warranty Card</title>
<style>
body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f9f9f9; }
.email-container { background: white; border-radius: 8px; padding: 30px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
.header { text-align: center; border-bottom: 2px solid #e0e0e0; padding-bottom: 20px; margin-bottom: 30px; }
.warranty-id { background: #f0f8ff; padding: 15px; border-radius: 6px; border-left: 4px solid #007bff; margin: 20px 0; }
.customer-details { background: #f8f9fa; padding: 20px; border-radius: 6px; margin: 20px 0; }
.detail-row { display: flex; justify-content: space-between; margin: 10px 0; padding: 8px 0; border-bottom: 1px solid #e9ecef; }
.detail-label { font-weight: bold; color: #495057; }
.footer { text-align: center; margin-top: 30px; padding-top: 20px; border-top: 1px solid #e0e0e0; color: #6c757d; font-size: 14px; }
.cta-button { display: inline-block; background: #007bff; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; margin: 20px 0; font-weight: bold; }
</style>
</head>
<body>
<div class="email-container">
<div class="header">
<h1 style="color: {{accent}}; margin: 0;">{{brand}} Warranty Card</h1>
<p style="color: #666; margin: 10px 0 0 0;">{{tagline}}</p>
</div>
<div class="warranty-id">
<h2 style="margin: 0 0 10px 0; color: #007bff;">Warranty ID: {{warrantyId}}</h2>
<p style="margin: 0; color: #666;">{{activationLine}}</p>
</div>
<div class="customer-details">
<h3 style="margin: 0 0 15px 0; color: {{accent}};">Customer Information</h3>
<div class="detail-row"><span class="detail-label">Name:</span><span>{{customerName}}</span></div>
<div class="detail-row"><span class="detail-label">Product:</span><span>{{product}}</span></div>
<div class="detail-row"><span class="detail-label">Purchase Date:</span><span>{{purchaseDate}}</span></div>
<div class="detail-row"><span class="detail-label">Email:</span><span>{{email}}</span></div>
<div class="detail-row"><span class="detail-label">Phone:</span><span>{{phone}}</span></div>
</div>
<div style="text-align: center;">
<p style="margin: 20px 0;">Your warranty card is ready! Click below to view:</p>
{{cardLink}}
</div>
<div class="footer">
<p>For any questions, please contact us at {{replyTo}}</p>
<p>&copy; {{brand}}. All rights reserved.</p>
</div>
</div>
</body>
</html>
"#;

/// Renders the warranty-card email for `brand`.
pub fn render_html(brand: Brand, data: &EmailTemplateData) -> Result<String, DashboardError> {
    let config = brand_config(brand);
    let card_link = data
        .warranty_card_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(|url| {
            format!(
                r#"<a href="{}" class="cta-button">View Warranty Card</a>"#,
                escape_html(url)
            )
        })
        .unwrap_or_default();

    let values: HashMap<&str, String> = HashMap::from([
        ("accent", config.accent.to_string()),
        ("brand", brand.to_string()),
        ("tagline", config.tagline.to_string()),
        ("activationLine", config.activation_line.to_string()),
        ("replyTo", config.reply_to.to_string()),
        ("warrantyId", escape_html(&data.warranty_id)),
        ("customerName", escape_html(&data.customer_name)),
        ("product", escape_html(&data.product)),
        ("purchaseDate", escape_html(&data.purchase_date)),
        ("email", escape_html(&data.email)),
        ("phone", escape_html(&data.phone)),
        ("cardLink", card_link),
    ]);

    let placeholder = PLACEHOLDER
        .as_ref()
        .ok_or_else(|| DashboardError::Config("Template placeholder pattern is invalid".to_string()))?;
    let rendered = placeholder.replace_all(WARRANTY_CARD_TEMPLATE, |caps: &Captures| {
        values.get(&caps[1]).cloned().unwrap_or_default()
    });
    Ok(rendered.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> EmailTemplateData {
        EmailTemplateData {
            customer_name: "Asha <script>".to_string(),
            warranty_id: "BB-1001".to_string(),
            product: "Stroller".to_string(),
            brand: "Baybee".to_string(),
            email: "asha@example.com".to_string(),
            phone: "98765".to_string(),
            purchase_date: "2024-06-01".to_string(),
            warranty_card_url: Some("https://cards.example.com/a?x=1&y=2".to_string()),
        }
    }

    #[test]
    fn subject_uses_brand_template() {
        assert_eq!(
            subject(Brand::Drogo, "DR-7"),
            "Your Drogo Warranty Card - DR-7"
        );
    }

    #[test]
    fn customer_values_are_escaped() {
        let html = render_html(Brand::Baybee, &data()).unwrap();
        assert!(html.contains("Asha &lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Warranty ID: BB-1001"));
        assert!(html.contains(r#"href="https://cards.example.com/a?x=1&amp;y=2""#));
        assert!(html.contains("#e91e63"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn card_button_is_omitted_without_url() {
        let mut data = data();
        data.warranty_card_url = None;
        let html = render_html(Brand::Domestica, &data).unwrap();
        assert!(!html.contains("cta-button\">"));
        assert!(html.contains("support@domestica.com"));
    }

    #[test]
    fn repeated_renders_share_the_placeholder_pattern() {
        assert!(PLACEHOLDER.is_some());
        let first = render_html(Brand::Drogo, &data()).unwrap();
        let second = render_html(Brand::Drogo, &data()).unwrap();
        assert_eq!(first, second);
        assert!(!second.contains("{{"));
    }
}
