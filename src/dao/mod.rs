mod postgre;

pub use postgre::{
    build_list_predicate, get_path, BindValue, DBRow, DataBase, PoolOption,
    PoolType, QueryResult,
};
