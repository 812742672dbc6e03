//! Integration tests for dnl-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::row::{LinkCurveRow, StepSummaryRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn curve_row(link: u32, boundary: u64) -> LinkCurveRow {
        LinkCurveRow {
            link,
            boundary,
            clock_secs:         boundary * 6,
            cumulative_inflow:  boundary as f64 * 1.5,
            cumulative_outflow: boundary as f64,
        }
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("link_curves.csv").exists());
        assert!(dir.path().join("step_summaries.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("link_curves.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["link", "boundary", "clock_secs", "cumulative_inflow", "cumulative_outflow"]);

        let mut rdr2 = csv::Reader::from_path(dir.path().join("step_summaries.csv")).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers2, ["step", "clock_secs", "iterations", "node_updates", "network_flow"]);
    }

    #[test]
    fn csv_curves_written_in_order() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_link_curves(&[curve_row(4, 0), curve_row(4, 1), curve_row(4, 2)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("link_curves.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[2][0], "4");  // link
        assert_eq!(&rows[2][1], "2");  // boundary
        assert_eq!(&rows[2][2], "12"); // clock_secs
        assert_eq!(rows[2][3].parse::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn csv_step_summary() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_step_summary(&StepSummaryRow {
            step:         3,
            clock_secs:   18,
            iterations:   2,
            node_updates: 9,
            network_flow: 0.25,
        })
        .unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("step_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][3], "9");
        assert_eq!(rows[0][4].parse::<f64>().unwrap(), 0.25);
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_missing_dir_is_an_error() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("missing")).is_err());
    }
}

// ── Observer bridge ───────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use tempfile::TempDir;

    use dnl_core::{DestinationId, LoadingConfig, OriginId, TimeDependentOdm};
    use dnl_link::{FundamentalDiagram, LinkKind};
    use dnl_loading::{IltmDnl, LoadingBuilder};
    use dnl_network::DynamicNetworkBuilder;
    use dnl_node::NodeModel;

    use crate::csv::CsvWriter;
    use crate::observer::LoadingOutputObserver;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn integration_csv() {
        let mut b = DynamicNetworkBuilder::new();
        let o = b.add_node(NodeModel::Origin { origin: OriginId(0) });
        let a = b.add_node(NodeModel::Linear);
        let z = b.add_node(NodeModel::Destination { destination: DestinationId(0) });
        b.add_connector(o, a);
        let fd = FundamentalDiagram::triangular(0.5, 1_800.0, 90.0, 150.0).unwrap();
        b.add_link(a, z, fd, LinkKind::Ltm);
        let network = b.build().unwrap();

        let config = LoadingConfig { total_steps: 100, ..LoadingConfig::default() };
        let mut odm = TimeDependentOdm::new(1, 1, 100);
        odm.set_range(OriginId(0), DestinationId(0), 0..5, 1_200.0);

        let mut loader = LoadingBuilder::new(config.clone(), network, odm, IltmDnl::default())
            .build()
            .unwrap();

        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = LoadingOutputObserver::new(writer, &config);
        let report = loader.load_network_with(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        let mut rdr = csv::Reader::from_path(dir.path().join("step_summaries.csv")).unwrap();
        assert_eq!(rdr.records().count(), report.steps_simulated);

        // Two links, each with boundaries 0..=steps_simulated.
        let mut rdr = csv::Reader::from_path(dir.path().join("link_curves.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2 * (report.steps_simulated + 1));

        let last = &rows[rows.len() - 1];
        assert_eq!(&last[0], "1");
        assert!((last[4].parse::<f64>().unwrap() - 10.0).abs() < 1e-6);
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use crate::row::{LinkCurveRow, StepSummaryRow};
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn row(link: u32, boundary: u64, up: f64, down: f64) -> LinkCurveRow {
        LinkCurveRow { link, boundary, clock_secs: boundary * 6, cumulative_inflow: up, cumulative_outflow: down }
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_curve_count() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_link_curves(&[row(0, 0, 0.0, 0.0), row(0, 1, 2.0, 0.0), row(1, 1, 0.0, 0.0)]).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM link_curves", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn sqlite_rewrite_replaces_point() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_link_curves(&[row(2, 5, 1.0, 0.5)]).unwrap();
        w.write_link_curves(&[row(2, 5, 3.0, 1.5)]).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (count, up): (i64, f64) = conn
            .query_row(
                "SELECT COUNT(*), MAX(cumulative_inflow) FROM link_curves WHERE link = 2",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(up, 3.0);
    }

    #[test]
    fn sqlite_step_summary() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_step_summary(&StepSummaryRow {
            step:         7,
            clock_secs:   42,
            iterations:   3,
            node_updates: 15,
            network_flow: 12.5,
        })
        .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (clock, iterations, flow): (i64, i64, f64) = conn
            .query_row(
                "SELECT clock_secs, iterations, network_flow FROM step_summaries WHERE step = 7",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(clock, 42);
        assert_eq!(iterations, 3);
        assert_eq!(flow, 12.5);
    }
}
