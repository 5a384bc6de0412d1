//! PDF text extraction

use std::path::Path;

use crate::domain::DomainError;

/// Extract the full text of a PDF file.
///
/// Pages are concatenated in order. Fails with an extraction error when the
/// file is missing, not a PDF, or encrypted.
pub fn extract_pdf_text(path: &Path) -> Result<String, DomainError> {
    let text = pdf_extract::extract_text(path).map_err(|e| {
        DomainError::extraction(format!(
            "Failed to extract text from {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(text)
}

/// Test-only PDF builder shared by ingestion, task, and router tests
#[cfg(test)]
pub mod fixture {
    /// Assemble a one-page PDF that draws `text` in Helvetica, with a
    /// correct xref table. `text` must not contain parentheses or
    /// backslashes.
    pub fn minimal_pdf(text: &str) -> Vec<u8> {
        let stream = format!("BT /F1 12 Tf 72 712 Td ({}) Tj ET", text);
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
             /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                stream.len(),
                stream
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_offset = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_offset
            )
            .as_bytes(),
        );

        pdf
    }
}
