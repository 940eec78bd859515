//! Occupancy reporting.
//!
//! The backend computes the report rows; this module carries the query,
//! the row shape and the summary arithmetic the report screen shows
//! under the table.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

/// Row of the occupancy report, as returned by `reportes/citas/preview`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "medico")]
    pub doctor: String,
    #[serde(rename = "especialidad")]
    pub specialty: String,
    #[serde(rename = "totalCitas")]
    pub total_appointments: u32,
    #[serde(rename = "totalHorarios")]
    pub total_slots: u32,
    #[serde(rename = "ocupacionPct")]
    pub occupancy_pct: f64,
}

impl ReportRow {
    pub fn band(&self) -> OccupancyBand {
        OccupancyBand::for_pct(self.occupancy_pct)
    }
}

/// Banding used to color occupancy figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyBand {
    High,
    Medium,
    Low,
}

impl OccupancyBand {
    /// At least 80 is high, at least 50 medium, anything below low.
    pub fn for_pct(pct: f64) -> Self {
        if pct >= 80.0 {
            OccupancyBand::High
        } else if pct >= 50.0 {
            OccupancyBand::Medium
        } else {
            OccupancyBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OccupancyBand::High => "alta",
            OccupancyBand::Medium => "media",
            OccupancyBand::Low => "baja",
        }
    }
}

/// Report filters. All four are required before the backend is asked.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportQuery {
    pub doctor_name: String,
    pub specialty_name: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ReportQuery {
    /// Query-string parameters in the names the backend expects.
    pub fn to_params(&self) -> [(&'static str, String); 4] {
        [
            ("medicoNombre", self.doctor_name.clone()),
            ("especialidadNombre", self.specialty_name.clone()),
            ("desde", self.from.to_string()),
            ("hasta", self.to.to_string()),
        ]
    }

    /// Filename given to the exported document.
    pub fn pdf_filename(&self) -> String {
        format!("reporte_citas_{}_{}.pdf", self.from, self.to)
    }

    /// Writes the exported document under `dir` using
    /// [`Self::pdf_filename`] and returns the full path.
    pub fn save_pdf(&self, bytes: &[u8], dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(self.pdf_filename());
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Totals shown under the report table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub total_appointments: u32,
    pub total_slots: u32,
    /// Rounded mean of the per-row percentages; zero when there are no
    /// rows.
    pub mean_occupancy_pct: u32,
}

impl ReportSummary {
    pub fn from_rows(rows: &[ReportRow]) -> Self {
        let total_appointments = rows.iter().map(|row| row.total_appointments).sum();
        let total_slots = rows.iter().map(|row| row.total_slots).sum();
        let mean_occupancy_pct = if rows.is_empty() {
            0
        } else {
            let sum: f64 = rows.iter().map(|row| row.occupancy_pct).sum();
            (sum / rows.len() as f64).round() as u32
        };

        ReportSummary {
            total_appointments,
            total_slots,
            mean_occupancy_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(doctor: &str, appointments: u32, slots: u32, pct: f64) -> ReportRow {
        ReportRow {
            doctor: doctor.to_string(),
            specialty: "Pediatría".to_string(),
            total_appointments: appointments,
            total_slots: slots,
            occupancy_pct: pct,
        }
    }

    #[test]
    fn rows_deserialize_from_wire_names() {
        let json = r#"[{
            "medico": "Alejandro Machado",
            "especialidad": "Pediatría",
            "totalCitas": 12,
            "totalHorarios": 16,
            "ocupacionPct": 75.0
        }]"#;
        let rows: Vec<ReportRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].total_appointments, 12);
        assert_eq!(rows[0].band(), OccupancyBand::Medium);
    }

    #[test]
    fn banding_edges() {
        assert_eq!(OccupancyBand::for_pct(100.0), OccupancyBand::High);
        assert_eq!(OccupancyBand::for_pct(80.0), OccupancyBand::High);
        assert_eq!(OccupancyBand::for_pct(79.9), OccupancyBand::Medium);
        assert_eq!(OccupancyBand::for_pct(50.0), OccupancyBand::Medium);
        assert_eq!(OccupancyBand::for_pct(49.9), OccupancyBand::Low);
        assert_eq!(OccupancyBand::for_pct(0.0), OccupancyBand::Low);
    }

    #[test]
    fn summary_totals_and_rounded_mean() {
        let rows = vec![
            row("A", 12, 16, 75.0),
            row("B", 4, 10, 40.0),
            row("C", 9, 10, 90.0),
        ];
        let summary = ReportSummary::from_rows(&rows);
        assert_eq!(summary.total_appointments, 25);
        assert_eq!(summary.total_slots, 36);
        // (75 + 40 + 90) / 3 = 68.33 → 68
        assert_eq!(summary.mean_occupancy_pct, 68);
    }

    #[test]
    fn summary_of_no_rows_is_zero() {
        let summary = ReportSummary::from_rows(&[]);
        assert_eq!(summary.total_appointments, 0);
        assert_eq!(summary.total_slots, 0);
        assert_eq!(summary.mean_occupancy_pct, 0);
    }

    fn query() -> ReportQuery {
        ReportQuery {
            doctor_name: "Alejandro Machado".to_string(),
            specialty_name: "Pediatría".to_string(),
            from: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        }
    }

    #[test]
    fn params_use_backend_names() {
        let params = query().to_params();
        assert_eq!(params[0], ("medicoNombre", "Alejandro Machado".to_string()));
        assert_eq!(params[1], ("especialidadNombre", "Pediatría".to_string()));
        assert_eq!(params[2], ("desde", "2025-06-01".to_string()));
        assert_eq!(params[3], ("hasta", "2025-06-30".to_string()));
    }

    #[test]
    fn pdf_filename_embeds_the_range() {
        assert_eq!(query().pdf_filename(), "reporte_citas_2025-06-01_2025-06-30.pdf");
    }

    #[test]
    fn save_pdf_writes_under_the_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = b"%PDF-1.4 contenido";

        let path = query().save_pdf(bytes, dir.path()).unwrap();

        assert!(path.ends_with("reporte_citas_2025-06-01_2025-06-30.pdf"));
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }
}
