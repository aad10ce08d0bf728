#![allow(dead_code)]

use serde_json::{json, Value};
use svcmap_core::model::{
    CallSite, ClassFile, ClassRole, ConfigFile, Endpoint, FileKind, HttpMethod, Location, Member,
    Method, MethodCall, MethodDecl, ProjectFile, RestCall, System,
};

/// Controller class at `path` with one GET endpoint and one outbound REST call.
pub fn controller(path: &str, class_name: &str) -> ProjectFile {
    let mut class = ClassFile::new(class_name, path, "com.example.api", FileKind::Class, ClassRole::Controller);
    class.methods.push(Method::Endpoint(Endpoint {
        method: MethodDecl::new(Member::new("getFoo", "com.example.api", class_name).at(Location::new(10, 14))),
        url: "/api/foo".to_string(),
        http_method: HttpMethod::Get,
    }));
    class.methods.push(Method::Plain(MethodDecl::new(
        Member::new("helper", "com.example.api", class_name).at(Location::new(16, 20)),
    )));
    class.method_calls.push(MethodCall::RestCall(RestCall {
        call: CallSite::new(Member::new("getForObject", "com.example.api", class_name).at(Location::new(12, 12))),
        url: "/api/bar".to_string(),
        http_method: HttpMethod::Get,
    }));
    ProjectFile::Class(class)
}

/// Plain service class with a single method.
pub fn service_class(path: &str, class_name: &str) -> ProjectFile {
    let mut class = ClassFile::new(class_name, path, "com.example.core", FileKind::Class, ClassRole::Service);
    class.methods.push(Method::Plain(MethodDecl::new(Member::new("run", "com.example.core", class_name))));
    ProjectFile::Class(class)
}

pub fn config_file(path: &str) -> ProjectFile {
    let name = path.rsplit('/').next().unwrap_or(path);
    ProjectFile::Config(ConfigFile::new(path, name, json!({"server": {"port": 8080}})))
}

/// Maven descriptor payload declaring `artifact`.
pub fn pom_payload(path: &str, artifact: &str) -> Value {
    json!({
        "type": "ConfigFile",
        "name": "pom.xml",
        "path": path,
        "fileType": "CONFIG",
        "data": {"project": {"artifactId": artifact}}
    })
}

pub fn payload(file: &ProjectFile) -> Value {
    serde_json::to_value(file).unwrap()
}

/// System with one microservice per `(name, root)` pair.
pub fn system_with(services: &[(&str, &str)]) -> System {
    let mut system = System::new("demo", "c0");
    for (name, root) in services {
        system.insert_microservice(svcmap_core::model::Microservice::new(*name, root)).unwrap();
    }
    system
}

/// Every method and call site of the class at `path` carries `name`.
pub fn owner_names(system: &System, path: &str) -> Vec<String> {
    let class = system.find_class(path).unwrap();
    class
        .methods
        .iter()
        .map(|m| m.decl().microservice_name.clone())
        .chain(class.method_calls.iter().map(|c| c.site().microservice_name.clone()))
        .collect()
}
