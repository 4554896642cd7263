//! # 关联装载
//!
//! include 在主查询之后按外键批量装载关联行（每种关联一条 IN 查询，
//! 不做 JOIN），再按父行分组回填。提供泛型装载函数与三个关联较多的
//! 实体的类型化 include 外观

use sea_orm::{
    ConnectionTrait, EntityTrait, JsonValue, LoaderTrait, QueryFilter, Related, Select,
};

use entity::{
    collections, comments, likes, positions, posts, simulation_accounts, transactions, users,
};

use crate::error::{DataError, Result};
use crate::query::{apply_order, Filter, OrderBy};

/// 关联行上的嵌套查询参数
#[derive(Debug, Clone)]
pub struct RelationQuery<R: EntityTrait> {
    pub filter: Option<Filter<R::Column>>,
    pub order: Vec<OrderBy<R::Column>>,
    /// 每个父行各自生效
    pub take: Option<usize>,
    pub skip: Option<usize>,
}

impl<R: EntityTrait> Default for RelationQuery<R> {
    fn default() -> Self {
        Self {
            filter: None,
            order: Vec::new(),
            take: None,
            skip: None,
        }
    }
}

impl<R: EntityTrait> RelationQuery<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter<R::Column>) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn order_by(mut self, order: OrderBy<R::Column>) -> Self {
        self.order.push(order);
        self
    }

    #[must_use]
    pub const fn take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }

    #[must_use]
    pub const fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    fn into_select(self) -> (Select<R>, Option<usize>, usize) {
        let mut select = R::find();
        if let Some(f) = self.filter {
            select = select.filter(f.into_condition());
        }
        let select = apply_order(select, &self.order, false);
        (select, self.take, self.skip.unwrap_or(0))
    }
}

/// 批量装载一对多关联，返回与父行等长的分组列表
///
/// take / skip 在装载后逐父行截断（IN 查询无法按组限行）
pub async fn load_related_many<P, R, C>(
    conn: &C,
    parents: &[P::Model],
    query: RelationQuery<R>,
) -> Result<Vec<Vec<R::Model>>>
where
    C: ConnectionTrait,
    P: EntityTrait + Related<R>,
    R: EntityTrait,
    P::Model: Sync,
    R::Model: Send + Sync,
{
    if parents.is_empty() {
        return Ok(Vec::new());
    }
    let (stmt, take, skip) = query.into_select();
    let mut groups = parents
        .load_many(stmt, conn)
        .await
        .map_err(DataError::from)?;
    if skip > 0 || take.is_some() {
        for group in &mut groups {
            if skip > 0 {
                if skip < group.len() {
                    group.drain(..skip);
                } else {
                    group.clear();
                }
            }
            if let Some(n) = take {
                group.truncate(n);
            }
        }
    }
    Ok(groups)
}

/// 批量装载一对一 / 多对一关联
pub async fn load_related_one<P, R, C>(
    conn: &C,
    parents: &[P::Model],
) -> Result<Vec<Option<R::Model>>>
where
    C: ConnectionTrait,
    P: EntityTrait + Related<R>,
    R: EntityTrait,
    P::Model: Sync,
    R::Model: Send + Sync,
{
    if parents.is_empty() {
        return Ok(Vec::new());
    }
    parents
        .load_one(R::find(), conn)
        .await
        .map_err(Into::into)
}

/// 同一操作里 select 与 include 互斥
pub fn ensure_select_include_exclusive(select: bool, include: bool) -> Result<()> {
    if select && include {
        return Err(DataError::validation(
            "select 与 include 不能在同一次查询中同时指定",
        ));
    }
    Ok(())
}

/// 读取操作的三种返回形态：整行、标量投影、带关联
#[derive(Debug)]
pub enum FindResult<M, W> {
    Rows(Vec<M>),
    Projected(Vec<JsonValue>),
    WithRelations(Vec<W>),
}

// ---------- 用户 ----------

/// 用户实体的 include 描述
#[derive(Debug, Default)]
pub struct UserInclude {
    pub posts: Option<RelationQuery<posts::Entity>>,
    pub comments: Option<RelationQuery<comments::Entity>>,
    pub likes: Option<RelationQuery<likes::Entity>>,
    pub collections: Option<RelationQuery<collections::Entity>>,
    pub simulation_account: bool,
}

impl UserInclude {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_none()
            && self.comments.is_none()
            && self.likes.is_none()
            && self.collections.is_none()
            && !self.simulation_account
    }
}

/// 用户行 + 已装载的关联；外层 None 表示该关联未被 include
#[derive(Debug)]
pub struct UserWithRelations {
    pub user: users::Model,
    pub posts: Option<Vec<posts::Model>>,
    pub comments: Option<Vec<comments::Model>>,
    pub likes: Option<Vec<likes::Model>>,
    pub collections: Option<Vec<collections::Model>>,
    pub simulation_account: Option<Option<simulation_accounts::Model>>,
}

pub async fn load_user_relations<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<users::Model>,
    include: UserInclude,
) -> Result<Vec<UserWithRelations>> {
    let posts = match include.posts {
        Some(q) => Some(load_related_many::<users::Entity, posts::Entity, _>(conn, &rows, q).await?),
        None => None,
    };
    let comments = match include.comments {
        Some(q) => {
            Some(load_related_many::<users::Entity, comments::Entity, _>(conn, &rows, q).await?)
        }
        None => None,
    };
    let likes = match include.likes {
        Some(q) => Some(load_related_many::<users::Entity, likes::Entity, _>(conn, &rows, q).await?),
        None => None,
    };
    let collections = match include.collections {
        Some(q) => {
            Some(load_related_many::<users::Entity, collections::Entity, _>(conn, &rows, q).await?)
        }
        None => None,
    };
    let accounts = if include.simulation_account {
        Some(
            load_related_one::<users::Entity, simulation_accounts::Entity, _>(conn, &rows).await?,
        )
    } else {
        None
    };

    let mut posts = posts.map(Vec::into_iter);
    let mut comments = comments.map(Vec::into_iter);
    let mut likes = likes.map(Vec::into_iter);
    let mut collections = collections.map(Vec::into_iter);
    let mut accounts = accounts.map(Vec::into_iter);

    Ok(rows
        .into_iter()
        .map(|user| UserWithRelations {
            user,
            posts: posts.as_mut().map(|it| it.next().unwrap_or_default()),
            comments: comments.as_mut().map(|it| it.next().unwrap_or_default()),
            likes: likes.as_mut().map(|it| it.next().unwrap_or_default()),
            collections: collections.as_mut().map(|it| it.next().unwrap_or_default()),
            simulation_account: accounts.as_mut().map(|it| it.next().unwrap_or_default()),
        })
        .collect())
}

// ---------- 动态 ----------

#[derive(Debug, Default)]
pub struct PostInclude {
    pub author: bool,
    pub comments: Option<RelationQuery<comments::Entity>>,
    pub likes: Option<RelationQuery<likes::Entity>>,
}

impl PostInclude {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.author && self.comments.is_none() && self.likes.is_none()
    }
}

#[derive(Debug)]
pub struct PostWithRelations {
    pub post: posts::Model,
    pub author: Option<Option<users::Model>>,
    pub comments: Option<Vec<comments::Model>>,
    pub likes: Option<Vec<likes::Model>>,
}

pub async fn load_post_relations<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<posts::Model>,
    include: PostInclude,
) -> Result<Vec<PostWithRelations>> {
    let authors = if include.author {
        Some(load_related_one::<posts::Entity, users::Entity, _>(conn, &rows).await?)
    } else {
        None
    };
    let comments = match include.comments {
        Some(q) => {
            Some(load_related_many::<posts::Entity, comments::Entity, _>(conn, &rows, q).await?)
        }
        None => None,
    };
    let likes = match include.likes {
        Some(q) => Some(load_related_many::<posts::Entity, likes::Entity, _>(conn, &rows, q).await?),
        None => None,
    };

    let mut authors = authors.map(Vec::into_iter);
    let mut comments = comments.map(Vec::into_iter);
    let mut likes = likes.map(Vec::into_iter);

    Ok(rows
        .into_iter()
        .map(|post| PostWithRelations {
            post,
            author: authors.as_mut().map(|it| it.next().unwrap_or_default()),
            comments: comments.as_mut().map(|it| it.next().unwrap_or_default()),
            likes: likes.as_mut().map(|it| it.next().unwrap_or_default()),
        })
        .collect())
}

// ---------- 模拟账户 ----------

#[derive(Debug, Default)]
pub struct AccountInclude {
    pub positions: Option<RelationQuery<positions::Entity>>,
    pub transactions: Option<RelationQuery<transactions::Entity>>,
}

impl AccountInclude {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_none() && self.transactions.is_none()
    }
}

#[derive(Debug)]
pub struct AccountWithRelations {
    pub account: simulation_accounts::Model,
    pub positions: Option<Vec<positions::Model>>,
    pub transactions: Option<Vec<transactions::Model>>,
}

pub async fn load_account_relations<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<simulation_accounts::Model>,
    include: AccountInclude,
) -> Result<Vec<AccountWithRelations>> {
    let positions = match include.positions {
        Some(q) => Some(
            load_related_many::<simulation_accounts::Entity, positions::Entity, _>(conn, &rows, q)
                .await?,
        ),
        None => None,
    };
    let transactions = match include.transactions {
        Some(q) => Some(
            load_related_many::<simulation_accounts::Entity, transactions::Entity, _>(
                conn, &rows, q,
            )
            .await?,
        ),
        None => None,
    };

    let mut positions = positions.map(Vec::into_iter);
    let mut transactions = transactions.map(Vec::into_iter);

    Ok(rows
        .into_iter()
        .map(|account| AccountWithRelations {
            account,
            positions: positions.as_mut().map(|it| it.next().unwrap_or_default()),
            transactions: transactions.as_mut().map(|it| it.next().unwrap_or_default()),
        })
        .collect())
}
