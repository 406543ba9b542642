//! Example demonstrating logging capabilities
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```

use inject::Injector;

// Example services
#[allow(dead_code)]
#[derive(Clone)]
struct Database {
    url: String,
}

#[allow(dead_code)]
#[derive(Clone)]
struct UserService {
    db: std::sync::Arc<Database>,
}

fn main() {
    // Uses JSON if logging-json is enabled, pretty if logging-pretty is
    #[cfg(feature = "logging")]
    {
        inject::logging::init();
    }

    println!("=== Inject Logging Demo ===\n");

    // Creating the engine logs "Creating injection engine"
    let injector = Injector::builder().detect_cycles(true).build();

    // Each registration logs "Registering singleton factory"
    injector.register(|_| {
        Ok(Database {
            url: "postgres://localhost/mydb".into(),
        })
    });

    injector.register(|r| {
        println!("  [App] UserService factory running...");
        Ok(UserService {
            db: r.resolve()?,
        })
    });

    // First resolve logs "Constructing singleton on first resolve" for the
    // whole chain, depth-first
    println!("Resolving UserService (first time - constructs chain):");
    let users = injector.resolve::<UserService>();
    println!("  -> connected to {}\n", users.db.url);

    // Second resolve logs a cache hit at trace level
    println!("Resolving UserService (second time - cache hit):");
    let again = injector.resolve::<UserService>();
    assert!(std::sync::Arc::ptr_eq(&users, &again));
    println!("  -> same instance\n");

    // Resets log what they dropped
    injector.reset_container();
    println!("Container reset; next resolve reconstructs the chain.");
    let _ = injector.resolve::<UserService>();
}
