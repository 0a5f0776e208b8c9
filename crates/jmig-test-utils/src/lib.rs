//! Testing utilities for JMIG workspace
//!
//! Shared fixtures: legacy project sources, descriptors and temp project trees.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use jmig_graph::{Artifact, Dependency, DependencyGraph, Scope};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const LEGACY_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.example</groupId>
  <artifactId>legacy-shop</artifactId>
  <version>1.0.0</version>
  <packaging>war</packaging>
  <properties>
    <servlet.version>4.0.1</servlet.version>
  </properties>
  <dependencies>
    <dependency>
      <groupId>javax.servlet</groupId>
      <artifactId>javax.servlet-api</artifactId>
      <version>${servlet.version}</version>
      <scope>provided</scope>
    </dependency>
    <dependency>
      <groupId>javax.persistence</groupId>
      <artifactId>javax.persistence-api</artifactId>
      <version>2.2</version>
    </dependency>
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
      <version>1.7.36</version>
    </dependency>
  </dependencies>
</project>
"#;

pub const LEGACY_GRADLE: &str = r#"
plugins { id 'war' }

group = 'com.example'
version = '1.0.0'

dependencies {
    compileOnly 'javax.servlet:javax.servlet-api:4.0.1'
    implementation 'javax.persistence:javax.persistence-api:2.2'
    testImplementation 'junit:junit:4.13.2'
}
"#;

pub const LEGACY_SERVLET: &str = r#"package com.example.web;

import javax.servlet.ServletException;
import javax.servlet.annotation.WebServlet;
import javax.servlet.http.HttpServlet;
import javax.servlet.http.HttpServletRequest;
import javax.servlet.http.HttpServletResponse;
import java.io.IOException;

@WebServlet("/hello")
public class HelloServlet extends HttpServlet {
    @Override
    protected void doGet(HttpServletRequest req, HttpServletResponse resp)
            throws ServletException, IOException {
        resp.getWriter().write("hello");
    }
}
"#;

pub const LEGACY_ENTITY: &str = r#"package com.example.model;

import javax.persistence.Entity;
import javax.persistence.Id;
import javax.validation.constraints.NotNull;
import javax.annotation.processing.Generated;

@Entity
@Generated("tool")
public class Order {
    @Id
    private Long id;

    @NotNull
    private String customer;
}
"#;

pub const LEGACY_PERSISTENCE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<persistence version="2.2"
    xmlns="http://xmlns.jcp.org/xml/ns/persistence"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xsi:schemaLocation="http://xmlns.jcp.org/xml/ns/persistence http://xmlns.jcp.org/xml/ns/persistence/persistence_2_2.xsd">
  <persistence-unit name="shop">
    <provider>org.hibernate.jpa.HibernatePersistenceProvider</provider>
    <properties>
      <property name="javax.persistence.jdbc.url" value="jdbc:h2:mem:shop"/>
    </properties>
  </persistence-unit>
</persistence>
"#;

pub const LEGACY_WEB_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<web-app xmlns="http://xmlns.jcp.org/xml/ns/javaee" version="4.0">
  <servlet>
    <servlet-name>hello</servlet-name>
    <servlet-class>com.example.web.HelloServlet</servlet-class>
  </servlet>
</web-app>
"#;

pub fn artifact(group: &str, artifact: &str, version: &str) -> Artifact {
    Artifact::compile(group, artifact, version).unwrap()
}

/// Graph with `root` depending directly on each of `deps`
pub fn project_graph(root: &Artifact, deps: &[Artifact]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    graph.add_node(root.clone());
    for dep in deps {
        graph.add_edge(Dependency::new(root.clone(), dep.clone(), Scope::Compile, false));
    }
    graph
}

/// Project tree inside a temporary directory
#[derive(Debug)]
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Maven project with one servlet, one entity and the JPA/web descriptors
    pub fn legacy_maven() -> Self {
        Self::new()
            .with_file("pom.xml", LEGACY_POM)
            .with_file("src/main/java/com/example/web/HelloServlet.java", LEGACY_SERVLET)
            .with_file("src/main/java/com/example/model/Order.java", LEGACY_ENTITY)
            .with_file("src/main/resources/META-INF/persistence.xml", LEGACY_PERSISTENCE_XML)
            .with_file("src/main/webapp/WEB-INF/web.xml", LEGACY_WEB_XML)
    }

    #[must_use]
    pub fn with_file(self, relative: &str, contents: &str) -> Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.file(relative)).unwrap()
    }
}

impl Default for TempProject {
    fn default() -> Self {
        Self::new()
    }
}
