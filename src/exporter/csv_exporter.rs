// ==========================================
// 门店物料分配系统 - CSV 导出器
// ==========================================

use crate::domain::distribution::DistributionRecord;
use crate::domain::types::ExportFormat;
use crate::exporter::error::{ExportError, ExportResult};
use crate::exporter::{DistributionExporter, EXPORT_HEADERS};
use csv::Writer;

pub struct CsvExporter;

impl DistributionExporter for CsvExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn export(&self, records: &[DistributionRecord]) -> ExportResult<Vec<u8>> {
        let mut wtr = Writer::from_writer(Vec::new());
        wtr.write_record(EXPORT_HEADERS)?;

        for record in records {
            let quantity = record.total_quantity.to_string();
            wtr.write_record([
                record.store_code.as_str(),
                record.product_code.as_str(),
                record.description.as_str(),
                quantity.as_str(),
            ])?;
        }

        wtr.into_inner()
            .map_err(|e| ExportError::CsvWriteError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::file_parser::CsvParser;

    fn record(store: &str, product: &str, description: &str, quantity: f64) -> DistributionRecord {
        DistributionRecord {
            store_code: store.to_string(),
            product_code: product.to_string(),
            description: description.to_string(),
            total_quantity: quantity,
        }
    }

    #[test]
    fn test_header_only_for_empty_input() {
        let blob = CsvExporter.export(&[]).unwrap();
        assert_eq!(
            String::from_utf8(blob).unwrap(),
            "CodLoja,Material,Descricao,QuantidadeTotal\n"
        );
    }

    #[test]
    fn test_round_trip_through_csv_parser() {
        let records = vec![
            record("S2", "A", "Arroz 5kg", 10.0),
            record("LOJA_PADRAO", "B", "Feijão, carioca", 2.5),
            record("S1", "C", "Café \"extra forte\"", 7.0),
        ];

        let blob = CsvExporter.export(&records).unwrap();
        let rows = CsvParser.parse_reader(blob.as_slice()).unwrap().rows;

        assert_eq!(rows.len(), records.len());
        for (row, expected) in rows.iter().zip(&records) {
            assert_eq!(row.get("CodLoja"), Some(expected.store_code.as_str()));
            assert_eq!(row.get("Material"), Some(expected.product_code.as_str()));
            assert_eq!(row.get("Descricao"), Some(expected.description.as_str()));
            let quantity: f64 = row.get("QuantidadeTotal").unwrap().parse().unwrap();
            assert_eq!(quantity, expected.total_quantity);
        }
    }
}
