//! Demonstration records seeded into empty collections

use agroavia_core::geo::Vertex;
use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{
    Aircraft, Customer, Field, FieldStatus, Operator, OperatorStatus, Order, OrderStatus,
};

/// Customer selected when nothing else is chosen
pub const DEMO_CUSTOMER_ID: &str = "customer_1";

pub fn fields(now: DateTime<Utc>) -> Vec<Field> {
    vec![Field {
        id: "field_1".to_string(),
        name: "Поле №1".to_string(),
        crop: "пшеница".to_string(),
        area: 45.2,
        price: 1000.0,
        region: "Московская область".to_string(),
        owner: "ИП Петров".to_string(),
        customer_id: DEMO_CUSTOMER_ID.to_string(),
        processing_date: NaiveDate::from_ymd_opt(2024, 1, 15),
        status: FieldStatus::Pending,
        coordinates: vec![
            Vertex::new(55.7558, 37.6173),
            Vertex::new(55.7500, 37.6200),
            Vertex::new(55.7450, 37.6150),
            Vertex::new(55.7558, 37.6173),
        ],
        center: Vertex::new(55.7517, 37.6174),
        created_at: now,
        updated_at: now,
    }]
}

fn aircraft(id: &str, kind: &str, speed: f64, width: f64, tank: f64, cost: f64) -> Aircraft {
    Aircraft {
        id: id.to_string(),
        kind: kind.to_string(),
        count: 1,
        speed,
        spread_width: width,
        tank_capacity: tank,
        hour_cost: cost,
    }
}

pub fn operators(now: DateTime<Utc>) -> Vec<Operator> {
    vec![
        Operator {
            id: "operator_1".to_string(),
            name: "Авиапарк №1".to_string(),
            pilot: String::new(),
            phone: "+7 (495) 123-45-67".to_string(),
            status: OperatorStatus::Active,
            notes: String::new(),
            aircrafts: vec![
                aircraft("ac_1", "АН-2", 180.0, 40.0, 1500.0, 7200.0),
                aircraft("ac_2", "Ми-2", 190.0, 30.0, 800.0, 9500.0),
            ],
            created_at: now,
            updated_at: now,
        },
        Operator {
            id: "operator_2".to_string(),
            name: "Сельхозавиация".to_string(),
            pilot: String::new(),
            phone: "+7 (495) 765-43-21".to_string(),
            status: OperatorStatus::Active,
            notes: String::new(),
            aircrafts: vec![
                aircraft("ac_3", "АН-2", 180.0, 40.0, 1500.0, 7000.0),
                aircraft("ac_4", "Ансат", 250.0, 35.0, 1000.0, 12000.0),
            ],
            created_at: now,
            updated_at: now,
        },
    ]
}

pub fn customers(now: DateTime<Utc>) -> Vec<Customer> {
    let customer = |id: &str, name: &str, contact: &str| Customer {
        id: id.to_string(),
        name: name.to_string(),
        contact: contact.to_string(),
        address: String::new(),
        phone: String::new(),
        email: String::new(),
        notes: String::new(),
        created_at: now,
        updated_at: now,
    };
    vec![
        customer(
            DEMO_CUSTOMER_ID,
            "ООО \"Агрохолдинг\"",
            "Иван Петров, +7 (495) 111-22-33",
        ),
        customer(
            "customer_2",
            "Фермерское хозяйство \"Нива\"",
            "Сергей Сидоров, +7 (495) 444-55-66",
        ),
    ]
}

pub fn orders(now: DateTime<Utc>) -> Vec<Order> {
    vec![Order {
        id: "order_1".to_string(),
        field_id: "field_1".to_string(),
        customer_id: DEMO_CUSTOMER_ID.to_string(),
        field_name: "Поле №1".to_string(),
        area: 120.5,
        crop: "пшеница".to_string(),
        status: OrderStatus::Completed,
        price: 1500.0,
        processing_date: NaiveDate::from_ymd_opt(2024, 6, 10),
        operator_id: Some("operator_1".to_string()),
        notes: String::new(),
        created_at: now,
        updated_at: Some(now),
        assigned_at: Some(now),
        completed_at: Some(now),
    }]
}
