#![allow(dead_code, unused_imports)]

pub mod database;
pub mod helpers;

pub use database::TestDb;
pub use helpers::{BoardFixture, add_member, count_rows, create_card, create_test_user, generate_test_email, setup_board};
