//! Command-line front end
//!
//! Works over the file-backed registry without a map widget. Field outlines
//! are entered as `lat,lng; lat,lng; ...` and go through the same workspace
//! path as manual entry in an interactive session.

use agroavia_core::{centroid_or, close_polygon, polygon_area_hectares, EventBus, MIN_POLYGON_VERTICES};
use agroavia_designer::{format_coordinates, parse_coordinates, FieldWorkspace};
use agroavia_registry::{
    orders_csv, DeletePolicy, ExportBundle, FieldStatus, FileStore, OrderQuery, OrderStatus,
    Registry,
};
use agroavia_settings::Config;
use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "agroavia", version, about = "Field and order management for aerial spraying")]
pub struct Cli {
    /// Config file (.toml or .json); the platform default is used when absent
    #[arg(long, global = true, env = "AGROAVIA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the record collections
    #[arg(long, global = true, env = "AGROAVIA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Customer to work for
    #[arg(long, short, global = true)]
    pub customer: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fill empty collections with demo records
    Seed,
    /// Manage fields of the current customer
    Fields {
        #[command(subcommand)]
        action: FieldCommand,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrderCommand,
    },
    /// Inspect and delete customers
    Customers {
        #[command(subcommand)]
        action: CustomerCommand,
    },
    /// Inspect operators and their fleets
    Operators {
        #[command(subcommand)]
        action: OperatorCommand,
    },
    /// Write the JSON bundle of the current customer
    Export {
        /// Target directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Measure an outline without storing it
    Area {
        /// `lat,lng; lat,lng; ...`
        coordinates: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum FieldCommand {
    List,
    Show {
        id: String,
    },
    Add {
        /// `lat,lng; lat,lng; ...` with at least three pairs
        #[arg(long)]
        coordinates: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        crop: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        status: Option<FieldStatus>,
    },
    Delete {
        id: String,
        /// block, orphan or cascade
        #[arg(long, default_value = "block")]
        policy: DeletePolicy,
    },
}

#[derive(Debug, Subcommand)]
pub enum OrderCommand {
    List {
        #[arg(long)]
        status: Option<OrderStatus>,
        /// Matches field name, crop or order id
        #[arg(long)]
        search: Option<String>,
    },
    /// Order counts per status
    Summary,
    Create {
        field_id: String,
    },
    Status {
        id: String,
        status: OrderStatus,
    },
    Assign {
        id: String,
        operator_id: String,
    },
    Delete {
        id: String,
    },
    /// Orders of the current customer as CSV
    Csv {
        /// Output file; stdout when absent
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum CustomerCommand {
    List,
    Show {
        id: String,
    },
    Delete {
        id: String,
        #[arg(long, default_value = "block")]
        policy: DeletePolicy,
    },
}

#[derive(Debug, Subcommand)]
pub enum OperatorCommand {
    List,
    Show {
        id: String,
    },
}

/// Load the configuration named on the command line
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load_or_default().context("loading default config")?,
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Execute one command, writing its report to `out`
pub fn run(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let store = FileStore::open(&config.storage.data_dir).with_context(|| {
        format!("opening data directory {}", config.storage.data_dir.display())
    })?;
    let registry = Arc::new(Registry::open(
        Arc::new(store),
        &config.storage,
        Arc::new(EventBus::new()),
    ));

    let mut workspace = FieldWorkspace::new(registry.clone(), &config);
    if let Some(id) = &cli.customer {
        workspace.select_customer(id)?;
    }

    match cli.command {
        Command::Seed => {
            let seeded = registry.seed_demo();
            writeln!(out, "Seeded {} empty collections", seeded)?;
        }
        Command::Fields { action } => fields(&mut workspace, action, out)?,
        Command::Orders { action } => orders(&mut workspace, action, out)?,
        Command::Customers { action } => customers(&mut workspace, action, out)?,
        Command::Operators { action } => operators(&registry, action, out)?,
        Command::Export { out: dir } => {
            let customer = current_customer(&workspace)?;
            let bundle = ExportBundle::collect(&registry, &customer);
            let path = dir.join(bundle.file_name(&customer));
            bundle.write_to(&path)?;
            writeln!(out, "{}", path.display())?;
        }
        Command::Area { coordinates } => {
            let vertices = parse_coordinates(&coordinates)?;
            if vertices.len() < MIN_POLYGON_VERTICES {
                bail!(
                    "an outline needs at least {} points, got {}",
                    MIN_POLYGON_VERTICES,
                    vertices.len()
                );
            }
            let ring = close_polygon(vertices);
            let center = centroid_or(&ring, config.map.default_center);
            writeln!(out, "area:   {:.2} ha", polygon_area_hectares(&ring))?;
            writeln!(out, "center: {}", center)?;
        }
    }
    Ok(())
}

fn current_customer(workspace: &FieldWorkspace) -> anyhow::Result<String> {
    workspace
        .selected_customer()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("no customer available; run `agroavia seed` or pass --customer"))
}

fn fields(
    workspace: &mut FieldWorkspace,
    action: FieldCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match action {
        FieldCommand::List => {
            for field in workspace.customer_fields() {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{:.2} ha\t{}\t{} points",
                    field.id,
                    field.name,
                    field.crop,
                    field.area,
                    field.status,
                    field.coordinates.len()
                )?;
            }
        }
        FieldCommand::Show { id } => {
            let field = workspace.registry().field(&id)?;
            writeln!(out, "id:          {}", field.id)?;
            writeln!(out, "name:        {}", field.name)?;
            writeln!(out, "crop:        {}", field.crop)?;
            writeln!(out, "area:        {:.2} ha", field.area)?;
            writeln!(out, "price:       {}", field.price)?;
            writeln!(out, "region:      {}", field.region)?;
            writeln!(out, "owner:       {}", field.owner)?;
            writeln!(out, "customer:    {}", field.customer_id)?;
            writeln!(out, "status:      {} ({})", field.status, field.status.label())?;
            if let Some(date) = field.processing_date {
                writeln!(out, "processing:  {}", date.format("%d.%m.%Y"))?;
            }
            writeln!(out, "center:      {}", field.center)?;
            writeln!(out, "outline:     {}", format_coordinates(&field.coordinates))?;
        }
        FieldCommand::Add {
            coordinates,
            name,
            crop,
            price,
            region,
            owner,
            status,
        } => {
            workspace.load_coordinates(&coordinates)?;
            let form = workspace.form_mut();
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(crop) = crop {
                form.crop = crop;
            }
            if let Some(price) = price {
                form.price = price;
            }
            if let Some(region) = region {
                form.region = region;
            }
            if let Some(owner) = owner {
                form.owner = owner;
            }
            if let Some(status) = status {
                form.status = status;
            }
            let field = workspace.create_field()?;
            writeln!(out, "{}\t{}\t{:.2} ha", field.id, field.name, field.area)?;
        }
        FieldCommand::Delete { id, policy } => {
            let removal = workspace.delete_field(&id, policy)?;
            writeln!(
                out,
                "Deleted field {} ({}, {})",
                removal.record.id,
                removal.policy,
                removal.dependents.describe()
            )?;
        }
    }
    Ok(())
}

fn orders(
    workspace: &mut FieldWorkspace,
    action: OrderCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let registry = workspace.registry().clone();
    match action {
        OrderCommand::List { status, search } => {
            let query = OrderQuery {
                customer_id: workspace.selected_customer().map(str::to_string),
                status,
                term: search,
            };
            for order in registry.search_orders(&query) {
                writeln!(
                    out,
                    "{}\t{}\t{:.2} ha\t{}\t{}\t{}",
                    order.id,
                    order.field_name,
                    order.area,
                    order.status,
                    order.price,
                    order.operator_id.as_deref().unwrap_or("-")
                )?;
            }
        }
        OrderCommand::Summary => {
            for (status, count) in registry.orders_by_status(workspace.selected_customer()) {
                writeln!(out, "{}\t{}", status, count)?;
            }
        }
        OrderCommand::Create { field_id } => {
            let order = workspace.create_order(&field_id)?;
            writeln!(out, "{}\t{}\t{}", order.id, order.field_name, order.status)?;
        }
        OrderCommand::Status { id, status } => {
            let order = registry.update_order_status(&id, status)?;
            writeln!(out, "{}\t{}", order.id, order.status)?;
        }
        OrderCommand::Assign { id, operator_id } => {
            let order = registry.assign_operator(&id, &operator_id)?;
            writeln!(out, "{}\tassigned to {}", order.id, operator_id)?;
        }
        OrderCommand::Delete { id } => {
            let order = registry.delete_order(&id)?;
            writeln!(out, "Deleted order {}", order.id)?;
        }
        OrderCommand::Csv { out: path } => {
            let orders = workspace.customer_orders();
            let csv = orders_csv(&orders, &registry.fields().all())?;
            match path {
                Some(path) => {
                    std::fs::write(&path, csv)
                        .with_context(|| format!("writing {}", path.display()))?;
                    writeln!(out, "{}", path.display())?;
                }
                None => out.write_all(csv.as_bytes())?,
            }
        }
    }
    Ok(())
}

fn customers(
    workspace: &mut FieldWorkspace,
    action: CustomerCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match action {
        CustomerCommand::List => {
            let selected = workspace.selected_customer().map(str::to_string);
            for customer in workspace.registry().customers().all() {
                let marker = if selected.as_deref() == Some(customer.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                writeln!(out, "{} {}\t{}\t{}", marker, customer.id, customer.name, customer.contact)?;
            }
        }
        CustomerCommand::Show { id } => {
            let customer = workspace.registry().customer(&id)?;
            let stats = workspace.registry().customer_stats(&id);
            writeln!(out, "{} ({})", customer.name, customer.id)?;
            writeln!(out, "fields:        {}", stats.total_fields)?;
            writeln!(out, "total area:    {:.2} ha", stats.total_area)?;
            writeln!(out, "orders:        {}", stats.total_orders)?;
            writeln!(out, "active orders: {}", stats.active_orders)?;
        }
        CustomerCommand::Delete { id, policy } => {
            let removal = workspace.delete_customer(&id, policy)?;
            writeln!(
                out,
                "Deleted customer {} ({}, {})",
                removal.record.id,
                removal.policy,
                removal.dependents.describe()
            )?;
        }
    }
    Ok(())
}

fn operators(registry: &Registry, action: OperatorCommand, out: &mut impl Write) -> anyhow::Result<()> {
    match action {
        OperatorCommand::List => {
            for operator in registry.operators().all() {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{} aircraft\t{}",
                    operator.id,
                    operator.name,
                    operator.status,
                    operator.total_aircraft(),
                    operator.aircraft_types()
                )?;
            }
        }
        OperatorCommand::Show { id } => {
            let operator = registry.operator(&id)?;
            let stats = registry.operator_stats(&id)?;
            let fleet = operator.fleet();
            writeln!(out, "{} ({})", operator.name, operator.id)?;
            writeln!(out, "pilot:            {}", operator.pilot)?;
            writeln!(out, "orders:           {}", stats.total_orders)?;
            writeln!(out, "completed:        {}", stats.completed_orders)?;
            writeln!(out, "in progress:      {}", stats.active_orders)?;
            writeln!(out, "aircraft:         {}", fleet.total_aircraft)?;
            writeln!(out, "avg speed:        {:.1} km/h", fleet.avg_speed)?;
            writeln!(out, "avg spread width: {:.1} m", fleet.avg_width)?;
            writeln!(out, "tank capacity:    {:.0} l", fleet.total_tank_capacity)?;
            writeln!(out, "avg hour cost:    {:.0}", fleet.avg_hour_cost)?;
            for aircraft in &operator.aircrafts {
                writeln!(
                    out,
                    "  {} x{}\tefficiency {:.2}",
                    aircraft.kind,
                    aircraft.count,
                    aircraft.efficiency()
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exec(dir: &TempDir, args: &[&str]) -> anyhow::Result<String> {
        let data_dir = dir.path().join("data");
        let mut argv = vec!["agroavia", "--data-dir", data_dir.to_str().unwrap()];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv)?;
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_parse_policies_and_statuses() {
        let cli = Cli::try_parse_from(["agroavia", "fields", "delete", "f1", "--policy", "cascade"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Fields {
                action: FieldCommand::Delete {
                    policy: DeletePolicy::Cascade,
                    ..
                }
            }
        ));

        let cli = Cli::try_parse_from(["agroavia", "orders", "status", "o1", "in_progress"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Orders {
                action: OrderCommand::Status {
                    status: OrderStatus::InProgress,
                    ..
                }
            }
        ));

        assert!(Cli::try_parse_from(["agroavia", "fields", "delete", "f1", "--policy", "nuke"]).is_err());
    }

    #[test]
    fn test_seed_add_and_list() {
        let dir = TempDir::new().unwrap();
        assert!(exec(&dir, &["seed"]).unwrap().contains("Seeded 4"));

        let added = exec(
            &dir,
            &[
                "fields",
                "add",
                "--coordinates",
                "55.80,37.50; 55.80,37.52; 55.81,37.52",
                "--name",
                "Северное",
            ],
        )
        .unwrap();
        assert!(added.contains("Северное"));

        let listed = exec(&dir, &["fields", "list"]).unwrap();
        assert_eq!(listed.lines().count(), 2);
        assert!(listed.contains("4 points"));
    }

    #[test]
    fn test_bad_outline_is_rejected() {
        let dir = TempDir::new().unwrap();
        exec(&dir, &["seed"]).unwrap();
        assert!(exec(&dir, &["fields", "add", "--coordinates", "55.8,37.5; 55.8,37.52"]).is_err());
        assert!(exec(&dir, &["area", "1,2; x,3; 4,5"]).is_err());
        assert_eq!(exec(&dir, &["fields", "list"]).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_blocked_delete_then_cascade() {
        let dir = TempDir::new().unwrap();
        exec(&dir, &["seed"]).unwrap();
        assert!(exec(&dir, &["fields", "delete", "field_1"]).is_err());
        let deleted = exec(&dir, &["fields", "delete", "field_1", "--policy", "cascade"]).unwrap();
        assert!(deleted.contains("cascade"));
        assert_eq!(exec(&dir, &["orders", "list"]).unwrap(), "");
    }

    #[test]
    fn test_orders_csv_and_export() {
        let dir = TempDir::new().unwrap();
        exec(&dir, &["seed"]).unwrap();
        let csv = exec(&dir, &["orders", "csv"]).unwrap();
        assert!(csv.starts_with("\"ID\",\"Field\""));
        assert!(csv.contains("\"order_1\""));

        let out = dir.path().to_str().unwrap().to_string();
        let path = exec(&dir, &["export", "--out", &out]).unwrap();
        let path = PathBuf::from(path.trim());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("agroaviatech_export_customer_1_"));
        assert!(path.exists());
    }

    #[test]
    fn test_area_of_demo_outline() {
        let dir = TempDir::new().unwrap();
        let report = exec(&dir, &["area", "55.7558,37.6173; 55.75,37.62; 55.745,37.615"]).unwrap();
        assert!(report.starts_with("area:"));
        assert!(report.contains("center:"));
    }
}
