pub use self::{
    path::get_path,
    subscription::{build_list_predicate, BindValue},
    types::{DBRow, DataBase, PoolOption, PoolType, QueryResult},
};

mod path;
mod subscription;
mod types;
mod user;
