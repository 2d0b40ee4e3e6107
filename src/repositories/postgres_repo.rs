// src/repositories/postgres_repo.rs
use async_trait::async_trait;
use deadpool_postgres::{GenericClient, Pool, PoolError};
use log::info;
use tokio_postgres::Row;

use super::{Datastore, DbError, PostChanges, WriteOp, WriteOutcome};
use crate::models::{Comment, CommentRecord, Image, ImageRecord, Post, PostRecord, Tag, User};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const POST_SELECT: &str = "
    SELECT p.id, p.title, p.content, p.created_at, p.author_id,
           u.username AS author_username, u.password AS author_password
    FROM posts p
    JOIN users u ON u.id = p.author_id";

const COMMENT_SELECT: &str = "
    SELECT c.id, c.content, c.author_id, c.post_id,
           u.username AS author_username, u.password AS author_password
    FROM comments c
    JOIN users u ON u.id = c.author_id";

impl From<tokio_postgres::Error> for DbError {
    fn from(err: tokio_postgres::Error) -> Self {
        match err.as_db_error() {
            Some(db) => DbError::with_code(db.code().code(), db.message()),
            None => DbError::new(err.to_string()),
        }
    }
}

impl From<PoolError> for DbError {
    fn from(err: PoolError) -> Self {
        DbError::new(format!("database pool error: {}", err))
    }
}

/// [`Datastore`] backed by PostgreSQL through a deadpool connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Applies `migrations/0001_init.sql`. Every statement is `IF NOT EXISTS`.
    pub async fn migrate(&self) -> Result<(), DbError> {
        let client = self.pool.get().await?;
        client.batch_execute(SCHEMA).await?;
        info!("database schema is up to date");
        Ok(())
    }
}

fn user_from_row(row: &Row) -> Result<User, tokio_postgres::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
    })
}

fn author_from_row(row: &Row, id: i32) -> Result<User, tokio_postgres::Error> {
    Ok(User {
        id,
        username: row.try_get("author_username")?,
        password: row.try_get("author_password")?,
    })
}

fn post_from_row(row: &Row) -> Result<Post, tokio_postgres::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        author_id: row.try_get("author_id")?,
    })
}

fn comment_from_row(row: &Row) -> Result<Comment, tokio_postgres::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        content: row.try_get("content")?,
        author_id: row.try_get("author_id")?,
        post_id: row.try_get("post_id")?,
    })
}

fn image_from_row(row: &Row) -> Result<Image, tokio_postgres::Error> {
    Ok(Image {
        id: row.try_get("id")?,
        url: row.try_get("url")?,
        post_id: row.try_get("post_id")?,
    })
}

fn tag_from_row(row: &Row) -> Result<Tag, tokio_postgres::Error> {
    Ok(Tag {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        post_id: row.try_get("post_id")?,
    })
}

/// Loads tags, images and comments for every post row in three queries.
async fn hydrate<C: GenericClient>(client: &C, rows: &[Row]) -> Result<Vec<PostRecord>, DbError> {
    let mut heads = Vec::with_capacity(rows.len());
    for row in rows {
        let post = post_from_row(row)?;
        let author = author_from_row(row, post.author_id)?;
        heads.push((post, author));
    }
    if heads.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = heads.iter().map(|(p, _)| p.id).collect();

    let tags = client
        .query("SELECT id, name, post_id FROM tags WHERE post_id = ANY($1) ORDER BY id", &[&ids])
        .await?
        .iter()
        .map(tag_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    let images = client
        .query("SELECT id, url, post_id FROM images WHERE post_id = ANY($1) ORDER BY id", &[&ids])
        .await?
        .iter()
        .map(image_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    let comment_sql = format!("{} WHERE c.post_id = ANY($1) ORDER BY c.id", COMMENT_SELECT);
    let mut comments = Vec::new();
    for row in client.query(comment_sql.as_str(), &[&ids]).await? {
        let comment = comment_from_row(&row)?;
        let author = author_from_row(&row, comment.author_id)?;
        comments.push(CommentRecord { comment, author, post: None });
    }

    Ok(heads
        .into_iter()
        .map(|(post, author)| PostRecord {
            tags: tags.iter().filter(|t| t.post_id == post.id).cloned().collect(),
            images: images.iter().filter(|i| i.post_id == post.id).cloned().collect(),
            comments: comments.iter().filter(|c| c.comment.post_id == post.id).cloned().collect(),
            post,
            author,
        })
        .collect())
}

async fn load_post<C: GenericClient>(client: &C, post_id: i32) -> Result<Option<PostRecord>, DbError> {
    let sql = format!("{} WHERE p.id = $1", POST_SELECT);
    let rows = client.query(sql.as_str(), &[&post_id]).await?;
    Ok(hydrate(client, &rows).await?.pop())
}

async fn insert_tags<C: GenericClient>(client: &C, post_id: i32, names: &[String]) -> Result<(), DbError> {
    for name in names {
        client
            .execute("INSERT INTO tags (name, post_id) VALUES ($1, $2)", &[name, &post_id])
            .await?;
    }
    Ok(())
}

async fn apply<C: GenericClient>(client: &C, op: &WriteOp) -> Result<WriteOutcome, DbError> {
    match op {
        WriteOp::DeleteTagsOfPost { post_id } => {
            let n = client.execute("DELETE FROM tags WHERE post_id = $1", &[post_id]).await?;
            Ok(WriteOutcome::Deleted(n))
        }
        WriteOp::UpdatePost { post_id, changes } => {
            client
                .query_opt(
                    "UPDATE posts SET title = $1, content = $2 WHERE id = $3 RETURNING id",
                    &[&changes.title, &changes.content, post_id],
                )
                .await?
                .ok_or_else(|| DbError::not_found("Record to update not found."))?;
            insert_tags(client, *post_id, &changes.tags).await?;
            let record = load_post(client, *post_id)
                .await?
                .ok_or_else(|| DbError::not_found("Record to update not found."))?;
            Ok(WriteOutcome::Post(record))
        }
    }
}

#[async_trait]
impl Datastore for PgStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, DbError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO users (username, password) VALUES ($1, $2) RETURNING id, username, password",
                &[&username, &password_hash],
            )
            .await?;
        Ok(user_from_row(&row)?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT id, username, password FROM users WHERE username = $1", &[&username])
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn create_post(&self, author_id: i32, changes: &PostChanges) -> Result<PostRecord, DbError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        let row = tx
            .query_one(
                "INSERT INTO posts (title, content, author_id) VALUES ($1, $2, $3) RETURNING id",
                &[&changes.title, &changes.content, &author_id],
            )
            .await?;
        let post_id: i32 = row.try_get("id")?;
        insert_tags(&tx, post_id, &changes.tags).await?;
        let record = load_post(&tx, post_id)
            .await?
            .ok_or_else(|| DbError::new("created post could not be read back"))?;
        tx.commit().await?;
        Ok(record)
    }

    async fn find_post(&self, post_id: i32) -> Result<Option<PostRecord>, DbError> {
        let client = self.pool.get().await?;
        load_post(&client, post_id).await
    }

    async fn find_posts(&self) -> Result<Vec<PostRecord>, DbError> {
        let client = self.pool.get().await?;
        let sql = format!("{} ORDER BY p.id", POST_SELECT);
        let rows = client.query(sql.as_str(), &[]).await?;
        hydrate(&client, &rows).await
    }

    async fn delete_post(&self, post_id: i32) -> Result<Post, DbError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "DELETE FROM posts WHERE id = $1 RETURNING id, title, content, created_at, author_id",
                &[&post_id],
            )
            .await?
            .ok_or_else(|| DbError::not_found("Record to delete does not exist."))?;
        Ok(post_from_row(&row)?)
    }

    async fn create_comment(&self, author_id: i32, post_id: i32, content: &str) -> Result<Comment, DbError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO comments (content, author_id, post_id) VALUES ($1, $2, $3)
                 RETURNING id, content, author_id, post_id",
                &[&content, &author_id, &post_id],
            )
            .await?;
        Ok(comment_from_row(&row)?)
    }

    async fn find_comment(&self, comment_id: i32) -> Result<Option<CommentRecord>, DbError> {
        let client = self.pool.get().await?;
        let sql = format!("{} WHERE c.id = $1", COMMENT_SELECT);
        let Some(row) = client.query_opt(sql.as_str(), &[&comment_id]).await? else {
            return Ok(None);
        };
        let comment = comment_from_row(&row)?;
        let author = author_from_row(&row, comment.author_id)?;
        let post = client
            .query_opt(
                "SELECT id, title, content, created_at, author_id FROM posts WHERE id = $1",
                &[&comment.post_id],
            )
            .await?
            .as_ref()
            .map(post_from_row)
            .transpose()?;
        Ok(Some(CommentRecord { comment, author, post }))
    }

    async fn update_comment(&self, comment_id: i32, content: &str) -> Result<Comment, DbError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "UPDATE comments SET content = $1 WHERE id = $2 RETURNING id, content, author_id, post_id",
                &[&content, &comment_id],
            )
            .await?
            .ok_or_else(|| DbError::not_found("Record to update not found."))?;
        Ok(comment_from_row(&row)?)
    }

    async fn delete_comment(&self, comment_id: i32) -> Result<Comment, DbError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "DELETE FROM comments WHERE id = $1 RETURNING id, content, author_id, post_id",
                &[&comment_id],
            )
            .await?
            .ok_or_else(|| DbError::not_found("Record to delete does not exist."))?;
        Ok(comment_from_row(&row)?)
    }

    async fn create_image(&self, post_id: i32, url: &str) -> Result<ImageRecord, DbError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO images (url, post_id) VALUES ($1, $2) RETURNING id, url, post_id",
                &[&url, &post_id],
            )
            .await?;
        let image = image_from_row(&row)?;
        let post_row = client
            .query_one(
                "SELECT id, title, content, created_at, author_id FROM posts WHERE id = $1",
                &[&post_id],
            )
            .await?;
        Ok(ImageRecord {
            image,
            post: post_from_row(&post_row)?,
        })
    }

    async fn delete_image(&self, image_id: i32) -> Result<Image, DbError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("DELETE FROM images WHERE id = $1 RETURNING id, url, post_id", &[&image_id])
            .await?
            .ok_or_else(|| DbError::not_found("Record to delete does not exist."))?;
        Ok(image_from_row(&row)?)
    }

    async fn transaction(&self, ops: Vec<WriteOp>) -> Result<Vec<WriteOutcome>, DbError> {
        let mut client = self.pool.get().await?;
        // dropping `tx` without commit rolls back
        let tx = client.transaction().await?;
        let mut outcomes = Vec::with_capacity(ops.len());
        for op in &ops {
            outcomes.push(apply(&tx, op).await?);
        }
        tx.commit().await?;
        Ok(outcomes)
    }
}
