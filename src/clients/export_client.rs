//! Provides the `ExportClient` for writing tables to `.xlsx` workbooks.

use crate::config::ImgwConfig;
use crate::error::ImgwError;
use crate::export::{export_named_sheets, export_table, ExportLayout, SpreadsheetArtifact};
use crate::operational::hydro::HydroCategory;
use crate::types::observation_table::ObservationTable;
use bon::bon;

pub const DEFAULT_FILE_STEM: &str = "imgw_dane";

/// Builds in-memory workbooks. Obtained through [`crate::Imgw::export()`].
///
/// Row limit and sheet prefix default to the client configuration. Use
/// [`crate::write_artifacts`] to put the results on disk.
pub struct ExportClient<'a> {
    config: &'a ImgwConfig,
}

#[bon]
impl<'a> ExportClient<'a> {
    pub(crate) fn new(config: &'a ImgwConfig) -> Self {
        Self { config }
    }

    /// Splits a table into sheets of at most `max_rows_per_sheet` rows.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use imgw_data::{ExportLayout, Imgw, ImgwError, ObservationTable};
    /// # async fn run(table: ObservationTable) -> Result<(), ImgwError> {
    /// let imgw = Imgw::new();
    /// let artifacts = imgw
    ///     .export()
    ///     .table(&table)
    ///     .max_rows_per_sheet(100_000)
    ///     .layout(ExportLayout::WorkbookPerSheet)
    ///     .call()
    ///     .await?;
    /// imgw_data::write_artifacts(std::path::Path::new("out"), &artifacts).await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// A row limit outside `[50_000, 500_000]` fails before any workbook is built.
    #[builder(start_fn = table)]
    #[doc(hidden)]
    pub async fn build_table(
        &self,
        #[builder(start_fn)] table: &ObservationTable,
        max_rows_per_sheet: Option<usize>,
        layout: Option<ExportLayout>,
        #[builder(into)] file_stem: Option<String>,
    ) -> Result<Vec<SpreadsheetArtifact>, ImgwError> {
        Ok(export_table(
            table,
            max_rows_per_sheet.unwrap_or(self.config.max_rows_per_sheet),
            &self.config.sheet_prefix,
            layout.unwrap_or_default(),
            file_stem.as_deref().unwrap_or(DEFAULT_FILE_STEM),
        )
        .await?)
    }

    /// One workbook with a sheet per named table.
    pub async fn named_sheets(
        &self,
        tables: Vec<(String, ObservationTable)>,
        file_stem: &str,
    ) -> Result<SpreadsheetArtifact, ImgwError> {
        Ok(export_named_sheets(tables, self.config.max_rows_per_sheet, file_stem).await?)
    }

    /// One workbook with a sheet per hydro measurement, named after the measurement.
    pub async fn hydro_categories(
        &self,
        categories: Vec<(HydroCategory, ObservationTable)>,
        file_stem: &str,
    ) -> Result<SpreadsheetArtifact, ImgwError> {
        let tables = categories
            .into_iter()
            .map(|(category, table)| (category.label.to_string(), table))
            .collect();
        self.named_sheets(tables, file_stem).await
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ImgwConfig;
    use crate::error::ErrorKind;
    use crate::export::ExportLayout;
    use crate::operational::hydro::HYDRO_CATEGORIES;
    use crate::test_support::{fake_imgw_with_config, FakeTransport, RecordingSleeper};
    use crate::types::observation_table::ObservationTable;
    use polars::prelude::*;

    fn table(rows: usize) -> ObservationTable {
        let values: Vec<f64> = (0..rows).map(|i| i as f64 / 10.0).collect();
        ObservationTable::new(df!("Temperatura" => values).unwrap())
    }

    #[tokio::test]
    async fn test_defaults_come_from_config() {
        let config = ImgwConfig::builder()
            .max_rows_per_sheet(50_000)
            .sheet_prefix("Pomiary")
            .build();
        let imgw = fake_imgw_with_config(config, &FakeTransport::new(), &RecordingSleeper::default());

        let artifacts = imgw.export().table(&table(100_001)).call().await.unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].file_name, "imgw_dane.xlsx");
        let names: Vec<&str> = artifacts[0].sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Pomiary1", "Pomiary2", "Pomiary3"]);
    }

    #[tokio::test]
    async fn test_overrides() {
        let imgw = fake_imgw_with_config(
            ImgwConfig::default(),
            &FakeTransport::new(),
            &RecordingSleeper::default(),
        );

        let artifacts = imgw
            .export()
            .table(&table(60_000))
            .max_rows_per_sheet(50_000)
            .layout(ExportLayout::WorkbookPerSheet)
            .file_stem("synop_2023")
            .call()
            .await
            .unwrap();
        let files: Vec<&str> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(files, vec!["synop_2023_1.xlsx", "synop_2023_2.xlsx"]);

        let err = imgw
            .export()
            .table(&table(10))
            .max_rows_per_sheet(1_000)
            .call()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_hydro_category_sheets() {
        let imgw = fake_imgw_with_config(
            ImgwConfig::default(),
            &FakeTransport::new(),
            &RecordingSleeper::default(),
        );
        let categories = vec![(HYDRO_CATEGORIES[0], table(5)), (HYDRO_CATEGORIES[2], table(2))];

        let artifact = imgw
            .export()
            .hydro_categories(categories, "hydro")
            .await
            .unwrap();
        let names: Vec<&str> = artifact.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Stan wody", "Przepływ"]);
        assert_eq!(artifact.total_rows(), 7);
    }
}
