//! End-to-end demo: capability traits resolved as singletons, plus opaque
//! construction from builder models.
//!
//! ```bash
//! cargo run --example injection
//! ```

use inject::{Build, BuildModel, Injector, BuilderRegistry};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Capabilities (the "API" every module may import)
// ---------------------------------------------------------------------------

trait Config: Send + Sync {
    fn database_url(&self) -> &str;
}

trait Database: Send + Sync {
    fn query(&self, sql: &str) -> String;
}

trait ReportRenderer: Send {
    fn render(&self) -> String;
}

/// Model describing a report; the concrete renderer stays private.
struct ReportModel {
    title: String,
    rows: usize,
}

impl BuildModel for ReportModel {
    type Output = Box<dyn ReportRenderer>;
}

// ---------------------------------------------------------------------------
// Implementations (known only to the composition root below)
// ---------------------------------------------------------------------------

struct EnvConfig {
    url: String,
}

impl Config for EnvConfig {
    fn database_url(&self) -> &str {
        &self.url
    }
}

struct PostgresDatabase {
    config: Arc<dyn Config>,
}

impl Database for PostgresDatabase {
    fn query(&self, sql: &str) -> String {
        format!("[{}] {sql}", self.config.database_url())
    }
}

struct TableRenderer {
    db: Arc<dyn Database>,
    title: String,
    rows: usize,
}

impl ReportRenderer for TableRenderer {
    fn render(&self) -> String {
        let data = self.db.query(&format!("SELECT * LIMIT {}", self.rows));
        format!("# {}\n{data}", self.title)
    }
}

// ---------------------------------------------------------------------------
// Composition root
// ---------------------------------------------------------------------------

fn main() {
    let injector = Injector::builder().detect_cycles(true).build();

    injector.register(|_| {
        Ok(Arc::new(EnvConfig {
            url: "postgres://localhost/demo".into(),
        }) as Arc<dyn Config>)
    });

    injector.register(|r| {
        let config = Arc::clone(&*r.resolve::<Arc<dyn Config>>()?);
        Ok(Arc::new(PostgresDatabase { config }) as Arc<dyn Database>)
    });

    let builders = BuilderRegistry::new();
    let captured = injector.clone();
    builders.register(move |model: ReportModel| {
        let db = Arc::clone(&*captured.resolve::<Arc<dyn Database>>());
        Box::new(TableRenderer {
            db,
            title: model.title,
            rows: model.rows,
        }) as Box<dyn ReportRenderer>
    });

    // Singletons: same database instance everywhere.
    let db1 = injector.resolve::<Arc<dyn Database>>();
    let db2 = injector.resolve::<Arc<dyn Database>>();
    assert!(Arc::ptr_eq(&db1, &db2));
    println!("{}", db1.query("SELECT 1"));

    // Models: a fresh renderer per build, parameters flowing through.
    let report = ReportModel {
        title: "Daily".into(),
        rows: 10,
    }
    .build(&builders);
    println!("{}", report.render());

    let report = ReportModel {
        title: "Weekly".into(),
        rows: 70,
    }
    .build(&builders);
    println!("{}", report.render());
}
