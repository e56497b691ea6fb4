use crate::output::{Artifact, ArtifactSet, ArtifactSink};
use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use tracing::info;

/// Uploads artifacts to `s3://<bucket>/<prefix>/<name>`, optionally gzip-compressed.
pub struct S3Sink {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
    gzip: bool,
}

impl S3Sink {
    pub fn new(client: aws_sdk_s3::Client, bucket: &str, prefix: &str, gzip: bool) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            prefix: prefix.trim_matches('/').to_string(),
            gzip,
        }
    }

    /// Creates a sink using the ambient AWS configuration (env vars, profile, etc.).
    pub async fn from_env(bucket: &str, prefix: &str, gzip: bool) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket, prefix, gzip)
    }

    async fn put(&self, artifact: &Artifact) -> Result<()> {
        let (key, body) = object_for(&self.prefix, artifact, self.gzip)?;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(artifact.content_type)
            .body(ByteStream::from(body));
        if self.gzip {
            request = request.content_encoding("gzip");
        }
        request.send().await?;

        info!(bucket = %self.bucket, key = %key, "Uploaded artifact");
        Ok(())
    }
}

#[async_trait]
impl ArtifactSink for S3Sink {
    #[tracing::instrument(skip_all, fields(bucket = %self.bucket, prefix = %self.prefix, gzip = self.gzip))]
    async fn publish(&self, artifacts: &ArtifactSet) -> Result<()> {
        for artifact in &artifacts.artifacts {
            self.put(artifact).await?;
        }
        info!(upload_count = artifacts.artifacts.len(), "S3 upload complete");
        Ok(())
    }
}

/// Builds the object key and body for one artifact.
fn object_for(prefix: &str, artifact: &Artifact, gzip: bool) -> Result<(String, Bytes)> {
    let name = if gzip {
        format!("{}.gz", artifact.name)
    } else {
        artifact.name.to_string()
    };
    let key = if prefix.is_empty() {
        name
    } else {
        format!("{}/{}", prefix, name)
    };

    let body = if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&artifact.bytes)?;
        Bytes::from(encoder.finish()?)
    } else {
        Bytes::copy_from_slice(&artifact.bytes)
    };

    Ok((key, body))
}
