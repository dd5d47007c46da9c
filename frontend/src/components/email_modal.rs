//! Warranty-card email modal: editable customer fields, live validation, a
//! rendered preview and the two-path send.

use common::email::{preview, validation_errors, EmailComposer};
use common::error::DashboardError;
use common::model::email::{DeliveryPath, EmailReceipt, EmailTemplateData};
use common::model::warranty::WarrantyRecord;
use log::info;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::helpers::{format_date, input_value, show_toast, ToastKind};
use crate::services::{Client, SmtpFallback};
use crate::tops_sheet::material_top_sheet::{close_top_sheet, open_top_sheet, MaterialTopSheet};

#[derive(Properties, PartialEq)]
pub struct EmailModalProps {
    pub client: Client,
    pub record: WarrantyRecord,
    /// SMTP relay used when the primary path fails.
    pub fallback_url: String,
    pub on_close: Callback<()>,
    /// Receives the warranty id after a successful send.
    pub on_sent: Callback<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailField {
    CustomerName,
    WarrantyId,
    Product,
    Brand,
    Email,
    Phone,
    PurchaseDate,
    WarrantyCardUrl,
}

impl EmailField {
    const ALL: [EmailField; 8] = [
        EmailField::CustomerName,
        EmailField::WarrantyId,
        EmailField::Product,
        EmailField::Brand,
        EmailField::Email,
        EmailField::Phone,
        EmailField::PurchaseDate,
        EmailField::WarrantyCardUrl,
    ];

    fn label(&self) -> &'static str {
        match self {
            EmailField::CustomerName => "Customer name",
            EmailField::WarrantyId => "Warranty ID",
            EmailField::Product => "Product",
            EmailField::Brand => "Brand",
            EmailField::Email => "Email",
            EmailField::Phone => "Phone",
            EmailField::PurchaseDate => "Purchase date",
            EmailField::WarrantyCardUrl => "Warranty card URL (optional)",
        }
    }

    fn get(&self, data: &EmailTemplateData) -> String {
        match self {
            EmailField::CustomerName => data.customer_name.clone(),
            EmailField::WarrantyId => data.warranty_id.clone(),
            EmailField::Product => data.product.clone(),
            EmailField::Brand => data.brand.clone(),
            EmailField::Email => data.email.clone(),
            EmailField::Phone => data.phone.clone(),
            EmailField::PurchaseDate => data.purchase_date.clone(),
            EmailField::WarrantyCardUrl => data.warranty_card_url.clone().unwrap_or_default(),
        }
    }

    fn set(&self, data: &mut EmailTemplateData, value: String) {
        match self {
            EmailField::CustomerName => data.customer_name = value,
            EmailField::WarrantyId => data.warranty_id = value,
            EmailField::Product => data.product = value,
            EmailField::Brand => data.brand = value,
            EmailField::Email => data.email = value,
            EmailField::Phone => data.phone = value,
            EmailField::PurchaseDate => data.purchase_date = value,
            EmailField::WarrantyCardUrl => {
                data.warranty_card_url = Some(value).filter(|url| !url.trim().is_empty())
            }
        }
    }
}

/// Template data prefilled from a table row.
pub fn template_data(record: &WarrantyRecord) -> EmailTemplateData {
    EmailTemplateData {
        customer_name: record.customer_name.clone(),
        warranty_id: record.warranty_id.clone(),
        product: record.product.clone(),
        brand: record.brand.map(|b| b.to_string()).unwrap_or_default(),
        email: record.email.clone(),
        phone: record.phone.clone(),
        purchase_date: format_date(record.timestamp),
        warranty_card_url: Some(record.warranty_card_url.clone())
            .filter(|url| !url.trim().is_empty()),
    }
}

pub enum Msg {
    SetField(EmailField, String),
    Send,
    Sent(Result<EmailReceipt, DashboardError>),
    Close,
}

pub struct EmailModal {
    data: EmailTemplateData,
    sending: bool,
    error: Option<String>,
    sheet_ref: NodeRef,
}

impl Component for EmailModal {
    type Message = Msg;
    type Properties = EmailModalProps;

    fn create(ctx: &Context<Self>) -> Self {
        EmailModal {
            data: template_data(&ctx.props().record),
            sending: false,
            error: None,
            sheet_ref: NodeRef::default(),
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, first_render: bool) {
        if first_render {
            open_top_sheet(self.sheet_ref.clone());
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SetField(field, value) => {
                field.set(&mut self.data, value);
                self.error = None;
                true
            }
            Msg::Send => {
                if self.sending || !validation_errors(&self.data).is_empty() {
                    return false;
                }
                self.sending = true;
                self.error = None;
                let composer = EmailComposer::new(
                    ctx.props().client.clone(),
                    SmtpFallback::new(&ctx.props().fallback_url),
                );
                let data = self.data.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    let result = composer.send(&data).await;
                    link.send_message(Msg::Sent(result));
                });
                true
            }
            Msg::Sent(Ok(receipt)) => {
                self.sending = false;
                let via = match receipt.via {
                    DeliveryPath::Primary => "backend",
                    DeliveryPath::Fallback => "SMTP fallback",
                };
                info!(
                    "Warranty card for {} sent via {} ({:?})",
                    self.data.warranty_id, via, receipt.message_id
                );
                show_toast(
                    &format!("Warranty card sent to {} via {}", self.data.email.trim(), via),
                    ToastKind::Success,
                );
                close_top_sheet(self.sheet_ref.clone());
                ctx.props().on_sent.emit(ctx.props().record.warranty_id.clone());
                false
            }
            Msg::Sent(Err(e)) => {
                self.sending = false;
                show_toast(&format!("Failed to send email: {}", e), ToastKind::Error);
                self.error = Some(e.to_string());
                true
            }
            Msg::Close => {
                close_top_sheet(self.sheet_ref.clone());
                ctx.props().on_close.emit(());
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let errors = validation_errors(&self.data);
        let rendered = preview(&self.data).ok();

        html! {
            <MaterialTopSheet node_ref={self.sheet_ref.clone()}>
                <div class="sheet-header">
                    <h3>{ "Send warranty card" }</h3>
                    <button onclick={link.callback(|_| Msg::Close)}>{ "Close" }</button>
                </div>
                <div class="email-layout">
                    <div class="email-form">
                        { for EmailField::ALL.into_iter().map(|field| html! {
                            <label>
                                { field.label() }
                                <input
                                    type="text"
                                    value={field.get(&self.data)}
                                    oninput={link.callback(move |e: InputEvent| Msg::SetField(field, input_value(&e)))}
                                />
                            </label>
                        }) }

                        if !errors.is_empty() {
                            <ul class="error-list">
                                { for errors.iter().map(|error| html! { <li>{ error.clone() }</li> }) }
                            </ul>
                        }
                        if let Some(error) = &self.error {
                            <p class="error-list">{ error.clone() }</p>
                        }

                        <button
                            disabled={self.sending || !errors.is_empty()}
                            onclick={link.callback(|_| Msg::Send)}
                        >
                            { if self.sending { "Sending..." } else { "Send email" } }
                        </button>
                    </div>

                    <div class="email-preview">
                        {
                            match rendered {
                                Some(preview) => html! {
                                    <>
                                        <p><strong>{ "Subject: " }</strong>{ preview.subject.clone() }</p>
                                        <p>{ format!("From: {} <{}>", preview.from_name, preview.from_email) }</p>
                                        { Html::from_html_unchecked(AttrValue::from(preview.html_body.clone())) }
                                    </>
                                },
                                None => html! { <p>{ "Fix the fields to see a preview." }</p> },
                            }
                        }
                    </div>
                </div>
            </MaterialTopSheet>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::warranty::Brand;

    #[test]
    fn prefill_uses_record_fields() {
        let record = WarrantyRecord {
            warranty_id: "W-9".to_string(),
            customer_name: "Asha".to_string(),
            brand: Some(Brand::Baybee),
            email: "asha@example.com".to_string(),
            ..Default::default()
        };
        let data = template_data(&record);
        assert_eq!(data.brand, "Baybee");
        assert_eq!(data.warranty_id, "W-9");
        assert_eq!(data.purchase_date, "");
        assert_eq!(data.warranty_card_url, None);
    }

    #[test]
    fn blank_card_url_is_cleared() {
        let mut data = EmailTemplateData::default();
        EmailField::WarrantyCardUrl.set(&mut data, "https://x/card.pdf".to_string());
        assert_eq!(data.warranty_card_url.as_deref(), Some("https://x/card.pdf"));
        EmailField::WarrantyCardUrl.set(&mut data, "  ".to_string());
        assert_eq!(data.warranty_card_url, None);
    }
}
