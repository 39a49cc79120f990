// src/services/document_service.rs

// Geração dos PDFs de orçamento e pedido de venda com genpdf. O documento
// é montado a partir de um snapshot já carregado (nenhum acesso a banco
// aqui) e renderizado para um buffer em memória.

use chrono::{DateTime, Utc};
use genpdf::{elements, style, Alignment, Element};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::{
        quotes::QuoteWithItems,
        sales::SaleWithItems,
        settings::{Company, Seller},
    },
    services::pricing,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Quote,
    Sale,
}

impl DocumentKind {
    fn heading(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "ORÇAMENTO",
            DocumentKind::Sale => "PEDIDO DE VENDA",
        }
    }

    fn file_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "Orcamento",
            DocumentKind::Sale => "PedidoVenda",
        }
    }

    fn caption_label(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "Orçamento",
            DocumentKind::Sale => "Pedido de Venda",
        }
    }
}

pub struct PrintableItem {
    pub product_name: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub unit_price: i64,
    pub total_price: i64,
    pub fck: Option<i32>,
    pub slump: Option<i32>,
    pub stone_size: Option<String>,
}

impl PrintableItem {
    /// Linha de especificação do concreto: "FCK 30 | Slump 10 | Brita 1".
    fn spec_line(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(fck) = self.fck {
            parts.push(format!("FCK {}", fck));
        }
        if let Some(slump) = self.slump {
            parts.push(format!("Slump {}", slump));
        }
        if let Some(stone) = &self.stone_size {
            parts.push(format!("Brita {}", stone));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" | "))
        }
    }
}

/// Snapshot imprimível de um orçamento ou venda, já com empresa e vendedor.
pub struct PrintableDocument {
    pub kind: DocumentKind,
    pub display_id: i32,

    pub customer_name: String,
    pub customer_document: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,

    pub date: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,

    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
    pub notes: Option<String>,

    pub company: Company,
    pub seller: Option<Seller>,
    pub items: Vec<PrintableItem>,
}

impl PrintableDocument {
    pub fn from_quote(quote: &QuoteWithItems, company: Company, seller: Option<Seller>) -> Self {
        Self {
            kind: DocumentKind::Quote,
            display_id: quote.quote.display_id,
            customer_name: quote.quote.customer_name.clone(),
            customer_document: quote.quote.customer_document.clone(),
            customer_phone: quote.quote.customer_phone.clone(),
            customer_address: quote.quote.customer_address.clone(),
            date: quote.quote.date,
            valid_until: quote.quote.valid_until,
            delivery_date: None,
            subtotal: quote.quote.subtotal,
            discount: quote.quote.discount,
            total: quote.quote.total,
            notes: quote.quote.notes.clone(),
            company,
            seller,
            items: quote
                .items
                .iter()
                .map(|i| PrintableItem {
                    product_name: i.product_name.clone(),
                    quantity: i.quantity,
                    unit: i.unit.clone(),
                    unit_price: i.unit_price,
                    total_price: i.total_price,
                    fck: i.fck,
                    slump: i.slump,
                    stone_size: i.stone_size.clone(),
                })
                .collect(),
        }
    }

    pub fn from_sale(sale: &SaleWithItems, company: Company, seller: Option<Seller>) -> Self {
        Self {
            kind: DocumentKind::Sale,
            display_id: sale.sale.display_id,
            customer_name: sale.sale.customer_name.clone(),
            customer_document: sale.sale.customer_document.clone(),
            customer_phone: sale.sale.customer_phone.clone(),
            customer_address: sale.sale.customer_address.clone(),
            date: sale.sale.date,
            valid_until: None,
            delivery_date: sale.sale.delivery_date,
            subtotal: sale.sale.subtotal,
            discount: sale.sale.discount,
            total: sale.sale.total,
            notes: sale.sale.notes.clone(),
            company,
            seller,
            items: sale
                .items
                .iter()
                .map(|i| PrintableItem {
                    product_name: i.product_name.clone(),
                    quantity: i.quantity,
                    unit: i.unit.clone(),
                    unit_price: i.unit_price,
                    total_price: i.total_price,
                    fck: i.fck,
                    slump: i.slump,
                    stone_size: i.stone_size.clone(),
                })
                .collect(),
        }
    }

    /// "Orcamento_00042.pdf" / "PedidoVenda_00017.pdf"
    pub fn file_name(&self) -> String {
        format!("{}_{:05}.pdf", self.kind.file_prefix(), self.display_id)
    }

    /// Legenda que acompanha o documento no envio por mensagem.
    pub fn caption(&self) -> String {
        format!(
            "📄 {} de {}\nTotal: {}",
            self.kind.caption_label(),
            self.customer_name,
            pricing::format_brl(self.total)
        )
    }
}

#[derive(Clone)]
pub struct DocumentService {
    font_dir: String,
}

impl DocumentService {
    pub fn new(font_dir: impl Into<String>) -> Self {
        Self {
            font_dir: font_dir.into(),
        }
    }

    pub fn render(&self, document: &PrintableDocument) -> Result<Vec<u8>, AppError> {
        // Carrega a fonte da pasta 'fonts/'
        let font_family = genpdf::fonts::from_files(&self.font_dir, "Roboto", None)
            .map_err(|_| AppError::FontNotFound(format!("pasta {}", self.font_dir)))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("{} #{:05}", document.kind.heading(), document.display_id));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO DA EMPRESA ---
        doc.push(
            elements::Paragraph::new(document.company.name.clone())
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(
            elements::Paragraph::new(format!("CNPJ: {}", document.company.document))
                .styled(style::Style::new().with_font_size(10)),
        );
        if let Some(line) = company_address_line(&document.company) {
            doc.push(elements::Paragraph::new(line).styled(style::Style::new().with_font_size(10)));
        }
        if let Some(phone) = &document.company.phone {
            doc.push(
                elements::Paragraph::new(format!("Telefone: {}", phone))
                    .styled(style::Style::new().with_font_size(10)),
            );
        }

        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new(format!(
                "{} #{:05}",
                document.kind.heading(),
                document.display_id
            ))
            .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Data: {}",
            document.date.format("%d/%m/%Y")
        )));
        if let Some(valid_until) = document.valid_until {
            doc.push(elements::Paragraph::new(format!(
                "Válido até: {}",
                valid_until.format("%d/%m/%Y")
            )));
        }
        if let Some(delivery) = document.delivery_date {
            doc.push(elements::Paragraph::new(format!(
                "Entrega: {}",
                delivery.format("%d/%m/%Y")
            )));
        }

        doc.push(elements::Break::new(1));

        // --- CLIENTE ---
        doc.push(
            elements::Paragraph::new(format!("Cliente: {}", document.customer_name))
                .styled(style::Style::new().bold()),
        );
        if let Some(cpf_cnpj) = &document.customer_document {
            doc.push(elements::Paragraph::new(format!("CPF/CNPJ: {}", cpf_cnpj)));
        }
        if let Some(phone) = &document.customer_phone {
            doc.push(elements::Paragraph::new(format!("Telefone: {}", phone)));
        }
        if let Some(address) = &document.customer_address {
            doc.push(elements::Paragraph::new(format!("Endereço: {}", address)));
        }
        if let Some(seller) = &document.seller {
            doc.push(elements::Paragraph::new(format!("Vendedor: {}", seller.name)));
        }

        doc.push(elements::Break::new(2));

        // --- TABELA DE ITENS ---
        // Pesos das colunas: Produto (4), Qtd (1), Unitário (2), Total (2)
        let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Produto").styled(style_bold))
            .element(elements::Paragraph::new("Qtd").styled(style_bold))
            .element(elements::Paragraph::new("Unitário").styled(style_bold))
            .element(elements::Paragraph::new("Total").styled(style_bold))
            .push()
            .expect("Table error");

        for item in &document.items {
            let mut name_cell = elements::LinearLayout::vertical();
            name_cell.push(elements::Paragraph::new(item.product_name.clone()));
            if let Some(spec) = item.spec_line() {
                name_cell.push(
                    elements::Paragraph::new(spec).styled(style::Style::new().with_font_size(8)),
                );
            }

            let quantity = match &item.unit {
                Some(unit) => format!("{} {}", item.quantity, unit),
                None => item.quantity.to_string(),
            };

            table
                .row()
                .element(name_cell)
                .element(elements::Paragraph::new(quantity))
                .element(elements::Paragraph::new(pricing::format_brl(item.unit_price)))
                .element(elements::Paragraph::new(pricing::format_brl(item.total_price)))
                .push()
                .expect("Table row error");
        }

        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- TOTAIS ---
        if document.discount > 0 {
            let mut subtotal_paragraph = elements::Paragraph::new(format!(
                "Subtotal: {}",
                pricing::format_brl(document.subtotal)
            ));
            subtotal_paragraph.set_alignment(Alignment::Right);
            doc.push(subtotal_paragraph);

            let mut discount_paragraph = elements::Paragraph::new(format!(
                "Desconto: {}",
                pricing::format_brl(document.discount)
            ));
            discount_paragraph.set_alignment(Alignment::Right);
            doc.push(discount_paragraph);
        }

        let mut total_paragraph =
            elements::Paragraph::new(format!("TOTAL: {}", pricing::format_brl(document.total)));
        total_paragraph.set_alignment(Alignment::Right);
        doc.push(total_paragraph.styled(style::Style::new().bold().with_font_size(12)));

        // --- OBSERVAÇÕES ---
        if let Some(notes) = &document.notes {
            doc.push(elements::Break::new(2));
            doc.push(
                elements::Paragraph::new(format!("Observações: {}", notes))
                    .styled(style::Style::new().italic().with_font_size(9)),
            );
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok(buffer)
    }
}

fn company_address_line(company: &Company) -> Option<String> {
    let address = company.address.as_deref()?;
    match (company.city.as_deref(), company.state.as_deref()) {
        (Some(city), Some(state)) => Some(format!("{} — {}/{}", address, city, state)),
        (Some(city), None) => Some(format!("{} — {}", address, city)),
        _ => Some(address.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn company() -> Company {
        Company {
            id: Uuid::new_v4(),
            name: "Concreteira Alfa".to_string(),
            document: "12.345.678/0001-00".to_string(),
            email: None,
            phone: None,
            address: Some("Rua das Britas, 100".to_string()),
            city: Some("Campinas".to_string()),
            state: Some("SP".to_string()),
        }
    }

    fn document(kind: DocumentKind) -> PrintableDocument {
        PrintableDocument {
            kind,
            display_id: 42,
            customer_name: "Construtora Horizonte LTDA".to_string(),
            customer_document: None,
            customer_phone: None,
            customer_address: None,
            date: Utc::now(),
            valid_until: None,
            delivery_date: None,
            subtotal: 130000,
            discount: 0,
            total: 130000,
            notes: None,
            company: company(),
            seller: None,
            items: vec![],
        }
    }

    #[test]
    fn file_name_pads_display_id() {
        assert_eq!(document(DocumentKind::Quote).file_name(), "Orcamento_00042.pdf");
        assert_eq!(document(DocumentKind::Sale).file_name(), "PedidoVenda_00042.pdf");
    }

    #[test]
    fn caption_includes_customer_and_total() {
        assert_eq!(
            document(DocumentKind::Quote).caption(),
            "📄 Orçamento de Construtora Horizonte LTDA\nTotal: R$ 1.300,00"
        );
    }

    #[test]
    fn spec_line_joins_present_fields() {
        let item = PrintableItem {
            product_name: "Concreto Usinado".to_string(),
            quantity: Decimal::from(2),
            unit: Some("m3".to_string()),
            unit_price: 35000,
            total_price: 70000,
            fck: Some(30),
            slump: Some(10),
            stone_size: Some("1".to_string()),
        };
        assert_eq!(item.spec_line().as_deref(), Some("FCK 30 | Slump 10 | Brita 1"));

        let plain = PrintableItem { fck: None, slump: None, stone_size: None, ..item };
        assert_eq!(plain.spec_line(), None);
    }
}
